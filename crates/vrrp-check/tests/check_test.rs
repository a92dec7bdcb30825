//! Integration tests for the checker

use std::io::Write;

use vrrp_check::{ReportFormat, Settings, Verdict, check_file, render};

fn config_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_clean_configuration() {
    let file = config_file(
        "vrrp_instance VI_1 {\n    virtual_router_id 7\n    virtual_ipaddress {\n        10.0.0.1\n    }\n}\n",
    );

    let build = check_file(&Settings::default(), file.path()).unwrap();
    assert_eq!(Verdict::of(&build), Verdict::Clean);
    assert_eq!(build.config.instance("VI_1").unwrap().vrid, 7);
}

#[test]
fn test_settings_capacity_is_applied() {
    let file = config_file(
        "vrrp_instance VI_1 {\n    virtual_ipaddress {\n        10.0.0.1\n        10.0.0.2\n        10.0.0.3\n    }\n}\n",
    );
    let mut settings = Settings::default();
    settings.parser.max_virtual_addresses = 2;

    let build = check_file(&settings, file.path()).unwrap();
    let vrrp = build.config.instance("VI_1").unwrap();
    assert_eq!(vrrp.vips.len(), 2);
    assert_eq!(vrrp.excluded_vips.len(), 1);
    assert_eq!(Verdict::of(&build), Verdict::Warnings);
}

#[test]
fn test_errors_verdict() {
    let file = config_file(
        "vrrp_instance VI_1 {\n    native_ipv6\n    mcast_src_ip 10.0.0.1\n}\n",
    );

    let build = check_file(&Settings::default(), file.path()).unwrap();
    assert_eq!(Verdict::of(&build), Verdict::Errors);

    let text = render(&build, ReportFormat::Text).unwrap();
    assert!(text.contains("1 diagnostics (1 errors)"));
    assert!(text.contains("ERROR (VI_1)"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("keepalived.conf");

    let err = check_file(&Settings::default(), &missing).unwrap_err();
    assert!(err.to_string().contains("keepalived.conf"));
}

#[test]
fn test_sync_groups_are_linked() {
    let file = config_file(
        "vrrp_sync_group G {\n    group {\n        VI_1\n    }\n}\nvrrp_instance VI_1 {\n}\n",
    );

    let build = check_file(&Settings::default(), file.path()).unwrap();
    assert_eq!(
        build.config.instance("VI_1").unwrap().sync_group.as_deref(),
        Some("G")
    );

    let json = render(&build, ReportFormat::Json).unwrap();
    assert!(json.contains("\"sync_group\": \"G\""));
}
