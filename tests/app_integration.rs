use navstat::core::FundError;
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const DIRECTORY_JS: &str = r#"var r = [["000001","HXCZHH","华夏成长混合","混合型-偏股","HUAXIACHENGZHANGHUNHE"]];"#;

    /// One LSJZ page body; `dates` most recent first.
    pub fn page_body(dates: &[(&str, &str)], total_count: usize) -> String {
        let rows: Vec<String> = dates
            .iter()
            .map(|(date, nav)| format!(r#"{{"FSRQ":"{date}","DWJZ":"{nav}","LJJZ":"{nav}"}}"#))
            .collect();
        format!(
            r#"{{"Data":{{"LSJZList":[{}],"FundType":"001"}},"ErrCode":0,"ErrMsg":null,"TotalCount":{total_count},"PageSize":2}}"#,
            rows.join(",")
        )
    }

    pub async fn create_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/js/fundcode_search.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DIRECTORY_JS))
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub async fn mount_page(server: &MockServer, page: u32, body: String, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/f10/lsjz"))
            .and(query_param("fundCode", "000001"))
            .and(query_param("pageIndex", page.to_string()))
            .and(query_param("pageSize", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    pub fn write_config(dir: &std::path::Path, server_uri: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
providers:
  east_money:
    fund_list_url: "{server_uri}/js/fundcode_search.js"
    api_base_url: "{server_uri}"
    page_size: 2
data_path: "{}"
"#,
            dir.join("data").display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_across_pages() {
    let mock_server = test_utils::create_mock_server().await;
    test_utils::mount_page(
        &mock_server,
        1,
        test_utils::page_body(&[("2024-01-05", "1.2500"), ("2024-01-04", "1.0000")], 5),
        1,
    )
    .await;
    test_utils::mount_page(
        &mock_server,
        2,
        test_utils::page_body(&[("2024-01-03", "0.9000"), ("2024-01-02", "1.1000")], 5),
        1,
    )
    .await;
    // Page 3 must never be requested for a 3 day window
    test_utils::mount_page(
        &mock_server,
        3,
        test_utils::page_body(&[("2024-01-01", "5.0000")], 5),
        0,
    )
    .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = navstat::run_command(
        navstat::AppCommand::Statistics {
            fund_id: "000001".to_string(),
            num_days: 3,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    assert!(
        result.is_ok(),
        "Statistics command failed with: {:?}",
        result.err()
    );
    assert!(temp_dir.path().join("data").join("cache").exists());
}

#[test_log::test(tokio::test)]
async fn test_window_calculation_through_cached_provider() {
    use navstat::cli::statistics::calculate;
    use navstat::core::WindowAssembler;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    let mock_server = test_utils::create_mock_server().await;
    test_utils::mount_page(
        &mock_server,
        1,
        test_utils::page_body(&[("2024-01-05", "11.0"), ("2024-01-04", "9.0")], 4),
        1,
    )
    .await;
    test_utils::mount_page(
        &mock_server,
        2,
        test_utils::page_body(&[("2024-01-03", "12.5"), ("2024-01-02", "10.0")], 4),
        1,
    )
    .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let config = navstat::core::config::AppConfig::load_from_path(&config_path).unwrap();
    let provider = navstat::build_provider(&config).unwrap();
    let assembler = WindowAssembler::new(&provider);

    let report = calculate(&assembler, "000001", 4).await.unwrap();
    info!(?report, "Calculated report");

    assert_eq!(report.fund_name, "华夏成长混合");
    assert_eq!(report.statistics.max, Decimal::from_str("12.5").unwrap());
    assert_eq!(report.statistics.min, Decimal::from_str("9.0").unwrap());
    assert_eq!(
        report.statistics.average,
        Decimal::from_str("10.625").unwrap()
    );

    // Same request again is answered from the cache; mocks expect a single call each
    let again = calculate(&assembler, "000001", 4).await.unwrap();
    assert_eq!(again, report);
}

#[test_log::test(tokio::test)]
async fn test_unknown_fund_reports_not_found() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let err = navstat::run_command(
        navstat::AppCommand::Statistics {
            fund_id: "999999".to_string(),
            num_days: 3,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<FundError>(),
        Some(&FundError::FundNotFound("999999".to_string()))
    );
}

#[test_log::test(tokio::test)]
async fn test_short_history_reports_insufficient_history() {
    let mock_server = test_utils::create_mock_server().await;
    test_utils::mount_page(
        &mock_server,
        1,
        test_utils::page_body(&[("2024-01-05", "1.2500"), ("2024-01-04", "1.0000")], 3),
        1,
    )
    .await;
    test_utils::mount_page(
        &mock_server,
        2,
        test_utils::page_body(&[("2024-01-03", "0.9000")], 3),
        1,
    )
    .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let err = navstat::run_command(
        navstat::AppCommand::Statistics {
            fund_id: "000001".to_string(),
            num_days: 10,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<FundError>(),
        Some(&FundError::InsufficientHistory {
            fund_id: "000001".to_string(),
            requested: 10,
            available: 3,
        })
    );
}

#[test_log::test(tokio::test)]
async fn test_unreachable_provider_is_transport_failure() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    // Nothing listens on port 9 locally
    let config_path = test_utils::write_config(temp_dir.path(), "http://127.0.0.1:9");

    let err = navstat::run_command(
        navstat::AppCommand::Statistics {
            fund_id: "000001".to_string(),
            num_days: 3,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FundError>(),
        Some(FundError::Transport { .. })
    ));
}

#[test_log::test(tokio::test)]
async fn test_invalid_days_rejected_before_any_io() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing_config = temp_dir.path().join("missing.yaml");

    for num_days in [0, -5] {
        let err = navstat::run_command(
            navstat::AppCommand::Statistics {
                fund_id: "000001".to_string(),
                num_days,
            },
            Some(missing_config.to_str().unwrap()),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FundError>(),
            Some(FundError::InvalidInput(_))
        ));
    }
    assert!(!fs::exists(&missing_config).unwrap());
}
