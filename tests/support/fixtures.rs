//! Test fixtures and constants.

pub const DB_ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:db-AbCdEf";
pub const API_ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:api-GhIjKl";
pub const BROKEN_ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:broken-MnOpQr";
pub const DD_ARN: &str = "arn:aws:secretsmanager:us-east-1:123456789012:secret:dd-StUvWx";

pub const DB_SECRET: &str = r#"{"DB_USER":"app","DB_PASSWORD":"p@ss=word"}"#;
pub const API_SECRET: &str = r#"{"API_KEY":"sk-test-12345"}"#;

/// Registration identifier handed out by the mock runtime API.
pub const EXTENSION_ID: &str = "6f2c1a8e-0b1d-4c7e-9a3f-2d5e8b7c1a90";
