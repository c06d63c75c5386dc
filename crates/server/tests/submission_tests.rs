//! Document submission tests: the regional flow end to end.

mod common;

use axum::http::{StatusCode, header};
use common::*;
use portal_core::SUBMITTED;

#[tokio::test]
async fn test_regional_upload_end_to_end() {
    let server = TestServer::new().await;
    let cookie = server.login_regional(KERALA_RBM).await;

    let response = server
        .post_multipart(
            "/upload_aws",
            Some(&cookie),
            &[("stockist_code", "S1"), ("sales_value", "2500")],
            Some(("aws_files", "March scan.PDF", b"%PDF-1.4 aws")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let row = server.table().await.get("S1").unwrap();
    assert_eq!(row.aws_status, SUBMITTED);
    assert_eq!(row.aws_file, "Alpha_Pharma_S1_AWS.PDF");
    assert_eq!(row.aws_submitted_by, KERALA_RBM);
    assert_eq!(row.sales_value, "2500");
    assert_eq!(row.submission_date.len(), "2025-03-01 07:04:09".len());
    assert_eq!(row.sss_status, "");
    let table = server.table().await;
    let seed = seed_table();
    for code in ["S2", "S3", "S4"] {
        assert_eq!(table.get(code), seed.get(code), "{code}");
    }

    let stored = server
        .upload_root()
        .join("IMPERIA/Kerala/AWS/Alpha_Pharma_S1_AWS.PDF");
    assert_eq!(std::fs::read(&stored).unwrap(), b"%PDF-1.4 aws");

    let page = server.page("/dashboard", &cookie).await;
    assert!(page.contains("AWS uploaded for Alpha Pharma"));
    assert!(page.contains("/serve_upload/IMPERIA/Kerala/AWS/Alpha%5FPharma%5FS1%5FAWS%2EPDF"));

    let response = server
        .get(
            "/serve_upload/IMPERIA/Kerala/AWS/Alpha_Pharma_S1_AWS.PDF",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("inline")
    );
    assert_eq!(&body_bytes(response).await[..], b"%PDF-1.4 aws");
}

#[tokio::test]
async fn test_upload_for_row_with_blank_state() {
    let server = TestServer::new().await;
    server.seed(&seed_table_with_blank_state()).await;
    let cookie = server.login_regional(BLANK_STATE_RBM).await;

    let response = server
        .post_multipart(
            "/upload_aws",
            Some(&cookie),
            &[("stockist_code", "S9")],
            Some(("aws_files", "scan.pdf", b"blank state")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let row = server.table().await.get("S9").unwrap();
    assert_eq!(row.aws_status, SUBMITTED);
    assert_eq!(row.aws_file, "Epsilon_Stores_S9_AWS.pdf");
    let stored = server
        .upload_root()
        .join("META/Unassigned/AWS/Epsilon_Stores_S9_AWS.pdf");
    assert_eq!(std::fs::read(&stored).unwrap(), b"blank state");

    let page = server.page("/dashboard", &cookie).await;
    assert!(page.contains("AWS uploaded for Epsilon Stores"));
    assert!(page.contains("/serve_upload/META/Unassigned/AWS/Epsilon%5FStores%5FS9%5FAWS%2Epdf"));

    let response = server
        .get(
            "/serve_upload/META/Unassigned/AWS/Epsilon_Stores_S9_AWS.pdf",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"blank state");
}

#[tokio::test]
async fn test_blank_sales_value_keeps_existing() {
    let server = TestServer::new().await;
    let cookie = server.login_regional(KERALA_RBM).await;

    let response = server
        .post_multipart(
            "/upload_sss",
            Some(&cookie),
            &[("stockist_code", "S1"), ("sales_value", "  ")],
            Some(("sss_files", "sss.xlsx", b"sheet")),
        )
        .await;
    assert_eq!(location(&response), "/dashboard");

    let row = server.table().await.get("S1").unwrap();
    assert_eq!(row.sales_value, "100");
    assert_eq!(row.sss_status, SUBMITTED);
    assert_eq!(row.sss_file, "Alpha_Pharma_S1_SSS.xlsx");
    assert_eq!(row.aws_status, "");
}

#[tokio::test]
async fn test_reupload_replaces_file_under_same_name() {
    let server = TestServer::new().await;
    let cookie = server.login_regional(KERALA_RBM).await;

    for content in [&b"first"[..], &b"second"[..]] {
        server
            .post_multipart(
                "/upload_aws",
                Some(&cookie),
                &[("stockist_code", "S4")],
                Some(("aws_files", "scan.pdf", content)),
            )
            .await;
    }

    let folder = server.upload_root().join("META/Tamil_Nadu/AWS");
    let names: Vec<_> = std::fs::read_dir(&folder)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Delta_Drugs_S4_AWS.pdf".to_string()]);
    assert_eq!(
        std::fs::read(folder.join("Delta_Drugs_S4_AWS.pdf")).unwrap(),
        b"second"
    );
}

#[tokio::test]
async fn test_upload_requires_login() {
    let server = TestServer::new().await;

    let response = server
        .post_multipart(
            "/upload_aws",
            None,
            &[("stockist_code", "S1")],
            Some(("aws_files", "scan.pdf", b"x")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookie = session_cookie(&response).expect("cookie carrying the notice");

    let page = server.page("/login", &cookie).await;
    assert!(page.contains("Please login first."));
    assert_eq!(server.table().await, seed_table());
}

#[tokio::test]
async fn test_upload_for_unrouted_row_is_denied() {
    let server = TestServer::new().await;
    let cookie = server.login_regional(KERALA_RBM).await;

    let response = server
        .post_multipart(
            "/upload_aws",
            Some(&cookie),
            &[("stockist_code", "S3")],
            Some(("aws_files", "scan.pdf", b"x")),
        )
        .await;
    assert_eq!(location(&response), "/dashboard");

    let page = server.page("/dashboard", &cookie).await;
    assert!(page.contains("Access denied."));
    assert_eq!(server.table().await, seed_table());
    assert!(!server.upload_root().join("INFINA").exists());
}

#[tokio::test]
async fn test_unknown_code_and_missing_file() {
    let server = TestServer::new().await;
    let cookie = server.login_regional(KERALA_RBM).await;

    let response = server
        .post_multipart(
            "/upload_aws",
            Some(&cookie),
            &[("stockist_code", "NOPE")],
            Some(("aws_files", "scan.pdf", b"x")),
        )
        .await;
    assert_eq!(location(&response), "/dashboard");
    let page = server.page("/dashboard", &cookie).await;
    assert!(page.contains("Stockist not found!"));

    // File part present but with no filename, as browsers send it.
    let response = server
        .post_multipart(
            "/upload_sss",
            Some(&cookie),
            &[("stockist_code", "S1")],
            Some(("sss_files", "", b"")),
        )
        .await;
    assert_eq!(location(&response), "/dashboard");
    let page = server.page("/dashboard", &cookie).await;
    assert!(page.contains("No file selected!"));

    // A file sent under the other kind's field does not count.
    server
        .post_multipart(
            "/upload_sss",
            Some(&cookie),
            &[("stockist_code", "S1")],
            Some(("aws_files", "scan.pdf", b"x")),
        )
        .await;
    let page = server.page("/dashboard", &cookie).await;
    assert!(page.contains("No file selected!"));

    assert_eq!(server.table().await, seed_table());
    assert_eq!(std::fs::read_dir(server.upload_root()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_admin_upload_returns_to_admin_dashboard() {
    let server = TestServer::new().await;
    let cookie = server.login_admin(IMPERIA_ADMIN).await;

    let response = server
        .post_multipart(
            "/upload_sss",
            Some(&cookie),
            &[("stockist_code", "S2"), ("sales_value", "75")],
            Some(("sss_files", "s.csv", b"a,b")),
        )
        .await;
    assert_eq!(location(&response), "/admin_dashboard");

    let row = server.table().await.get("S2").unwrap();
    assert_eq!(row.sss_submitted_by, IMPERIA_ADMIN.0);
    assert_eq!(row.sales_value, "75");

    // Other divisions stay out of reach.
    let response = server
        .post_multipart(
            "/upload_sss",
            Some(&cookie),
            &[("stockist_code", "S3")],
            Some(("sss_files", "s.csv", b"a,b")),
        )
        .await;
    assert_eq!(location(&response), "/admin_dashboard");
    assert_eq!(server.table().await.get("S3"), seed_table().get("S3"));
}

#[tokio::test]
async fn test_upload_over_body_limit_is_rejected() {
    let server = TestServer::with_config(|config| config.server.max_upload_bytes = 1024).await;
    let cookie = server.login_regional(KERALA_RBM).await;

    let big = vec![b'x'; 4096];
    let response = server
        .post_multipart(
            "/upload_aws",
            Some(&cookie),
            &[("stockist_code", "S1")],
            Some(("aws_files", "big.pdf", &big)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(server.table().await, seed_table());
}
