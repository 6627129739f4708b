/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for input validation and configuration parsing

use clap::Parser;
use common::input::*;
use common::types::Cli;

#[test]
fn test_port_in_range() {
    assert_eq!(port_in_range("8080").unwrap(), 8080);
    assert_eq!(port_in_range("65535").unwrap(), 65535);
    assert_eq!(port_in_range("65536").unwrap_err(), "port not in range 1-65535");
    assert_eq!(port_in_range("0").unwrap_err(), "port not in range 1-65535");
    assert_eq!(port_in_range("abc").unwrap_err(), "`abc` is not a port number");
}

#[test]
fn test_greater_than_zero() {
    assert_eq!(greater_than_zero::<i64>("24").unwrap(), 24);
    assert_eq!(greater_than_zero::<usize>("0").unwrap_err(), "`0` is not larger than 0");
    assert!(greater_than_zero::<i64>("-3").is_err());
    assert!(greater_than_zero::<i64>("x").is_err());
}

#[test]
fn test_normalize_mobile() {
    assert_eq!(normalize_mobile("09121234567").unwrap(), "09121234567");
    assert_eq!(normalize_mobile("+989121234567").unwrap(), "09121234567");
    assert_eq!(normalize_mobile("00989121234567").unwrap(), "09121234567");
    assert_eq!(normalize_mobile("989121234567").unwrap(), "09121234567");
    assert_eq!(normalize_mobile("9121234567").unwrap(), "09121234567");
    assert_eq!(normalize_mobile("۰۹۱۲-۱۲۳ ۴۵۶۷").unwrap(), "09121234567");
    assert_eq!(normalize_mobile("٠٩١٢١٢٣٤٥٦٧").unwrap(), "09121234567");

    assert_eq!(normalize_mobile("0912123456"), Err(InputError::InvalidMobile));
    assert_eq!(normalize_mobile("02112345678"), Err(InputError::InvalidMobile));
    assert_eq!(normalize_mobile(""), Err(InputError::InvalidMobile));
}

#[test]
fn test_validate_password() {
    assert!(validate_password("secret123").is_ok());
    assert!(validate_password("رمزعبور۱۲۳").is_ok());
    assert_eq!(validate_password("a1"), Err(InputError::PasswordTooShort));
    assert_eq!(validate_password("abcdefghij"), Err(InputError::PasswordTooSimple));
    assert_eq!(validate_password("1234567890"), Err(InputError::PasswordTooSimple));
    assert_eq!(
        validate_password(&format!("a1{}", "x".repeat(127))),
        Err(InputError::PasswordTooLong)
    );
}

#[test]
fn test_normalize_persian() {
    // Arabic yeh and kaf fold to their Persian forms
    assert_eq!(normalize_persian("كيفيت"), "کیفیت");
    assert_eq!(normalize_persian("اضافه\u{200C}کاری"), "اضافه کاری");
    assert_eq!(normalize_persian("  حقوق   ۱۴۰۳ "), "حقوق 1403");
    assert_eq!(normalize_persian("Salary"), "salary");
}

#[test]
fn test_require_text() {
    assert_eq!(require_text("عنوان", "  سلام ", 10).unwrap(), "سلام");
    assert_eq!(
        require_text("عنوان", "   ", 10),
        Err(InputError::Required("عنوان".to_string()))
    );
    assert_eq!(
        require_text("عنوان", "سلام دنیا", 4),
        Err(InputError::TooLong {
            field: "عنوان".to_string(),
            max: 4
        })
    );

    assert_eq!(optional_text("توضیحات", None, 10).unwrap(), None);
    assert_eq!(optional_text("توضیحات", Some("  "), 10).unwrap(), None);
    assert_eq!(
        optional_text("توضیحات", Some("متن"), 10).unwrap(),
        Some("متن".to_string())
    );
}

#[test]
fn test_check_range() {
    assert!(check_range("پیشرفت", 0, 0, 100).is_ok());
    assert!(check_range("پیشرفت", 100, 0, 100).is_ok());
    assert!(check_range("پیشرفت", 101, 0, 100).is_err());
}

#[test]
fn test_parse_keywords() {
    assert_eq!(
        parse_keywords("حقوق, مرخصی،بیمه,, حقوق"),
        vec!["حقوق", "مرخصی", "بیمه"]
    );
    assert!(parse_keywords(" , ").is_empty());
}

#[test]
fn test_sanitize_file_name() {
    assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
    assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_file_name("C:\\docs\\my file.docx"), "my_file.docx");
    assert_eq!(sanitize_file_name("..."), "file");
}

#[test]
fn test_page_bounds() {
    assert_eq!(page_bounds(None, None), (1, 20));
    assert_eq!(page_bounds(Some(0), Some(0)), (1, 1));
    assert_eq!(page_bounds(Some(3), Some(500)), (3, 100));
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from([
        "intranet-server",
        "--jwt-secret-file",
        "/run/secrets/jwt",
        "--analytics-keywords",
        "حقوق,بیمه",
    ])
    .unwrap();

    assert_eq!(cli.port, 3000);
    assert_eq!(cli.jwt_lifetime_hours, 24);
    assert_eq!(cli.max_upload_size, 10485760);
    assert_eq!(cli.keywords(), vec!["حقوق", "بیمه"]);
}

#[test]
fn test_cli_rejects_invalid_port() {
    let cli = Cli::try_parse_from([
        "intranet-server",
        "--jwt-secret-file",
        "/run/secrets/jwt",
        "--port",
        "70000",
    ]);

    assert!(cli.is_err());
}
