use clap::Parser;
use mockito::{Matcher, Server};

use scrapgox::cli::{run_with, Cli};
use scrapgox::{ApiError, ClientConfig, ScrapboxClient};

mod test_helpers {
    use super::*;

    pub const TEST_TOKEN: &str = "test_token";
    pub const TEST_AGENT: &str = "scrapgox-tests";

    pub fn client_for(server: &Server, token: Option<&str>) -> ScrapboxClient {
        let config = ClientConfig::new(&server.url(), token.map(str::to_string), TEST_AGENT)
            .expect("mock server url should be valid");
        ScrapboxClient::new(config).expect("client should build")
    }

    pub fn paging(q: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("skip".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "30".into()),
            Matcher::UrlEncoded("q".into(), q.into()),
        ])
    }

    pub fn pages_body(titles: &[&str]) -> String {
        let pages: Vec<serde_json::Value> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                serde_json::json!({
                    "id": format!("id{i}"),
                    "title": title,
                    "image": null,
                    "descriptions": [],
                    "user": { "id": "u" },
                    "pin": 0,
                    "views": i,
                    "linked": 0,
                    "created": 1500000000,
                    "updated": 1500000000,
                    "accessed": 1500000000,
                    "snapshotCreated": null,
                    "snipet": []
                })
            })
            .collect();
        serde_json::json!({
            "projectName": "test",
            "limit": 30,
            "count": titles.len(),
            "pages": pages
        })
        .to_string()
    }
}

use test_helpers::*;

#[test]
fn lists_pages_without_query() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/pages/help-jp")
        .match_query(paging(""))
        .match_header("cookie", "connect.sid=test_token")
        .match_header("user-agent", TEST_AGENT)
        .match_header("content-type", "application/x-www-form-urlencoded")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(pages_body(&["Zeta", "Alpha", "Mu"]))
        .create();

    let client = client_for(&server, Some(TEST_TOKEN));
    let pages = client.get_pages("help-jp", "").unwrap();

    mock.assert();
    let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Zeta", "Alpha", "Mu"]);
}

#[test]
fn searches_with_escaped_query() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/pages/test/search/query")
        .match_query(paging("foo bar"))
        .match_header("cookie", Matcher::Missing)
        .with_status(200)
        .with_body(pages_body(&["foo bar baz"]))
        .create();

    let client = client_for(&server, None);
    let pages = client.get_pages("test", "foo bar").unwrap();

    mock.assert();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "foo bar baz");
}

#[test]
fn empty_result_is_empty_vec() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/empty")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(pages_body(&[]))
        .create();

    let pages = client_for(&server, None).get_pages("empty", "").unwrap();
    assert!(pages.is_empty());
}

#[test]
fn null_fields_do_not_hide_titles() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/p")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"projectName":"p","count":1,"query":null,
                "pages":[{"id":"1","title":"T","descriptions":null,"user":null,"pin":0,"snipet":null}]}"#,
        )
        .create();

    let pages = client_for(&server, None).get_pages("p", "").unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "T");
}

#[test]
fn non_200_status_is_an_error_with_status_text() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"name":"NotFoundError","message":"Project not found."}"#)
        .create();

    let err = client_for(&server, None).get_pages("missing", "").unwrap_err();
    assert!(matches!(err, ApiError::Status(_)));
    assert!(err.to_string().contains("404 Not Found"), "{err}");
}

#[test]
fn other_success_codes_are_rejected() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/test")
        .match_query(Matcher::Any)
        .with_status(204)
        .create();

    let err = client_for(&server, None).get_pages("test", "").unwrap_err();
    assert!(err.to_string().contains("204 No Content"), "{err}");
}

#[test]
fn malformed_body_is_a_decode_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/test")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let err = client_for(&server, None).get_pages("test", "").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "{err}");
}

#[test]
fn transport_failure_is_reported() {
    // Nothing listens on the discard port.
    let config = ClientConfig::new("http://127.0.0.1:9", None, TEST_AGENT).unwrap();
    let err = ScrapboxClient::new(config)
        .unwrap()
        .get_pages("test", "")
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err}");
}

#[test]
fn search_returns_full_response() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/test/search/query")
        .match_query(paging("rust"))
        .with_status(200)
        .with_body(
            r#"{"projectName":"test","searchQuery":"rust","limit":30,"count":42,
                "existsExactTitleMatch":true,
                "query":{"words":["rust"],"excludes":[]},
                "pages":[{"id":"1","title":"rust","snipet":["[rust]"]}]}"#,
        )
        .create();

    let client = client_for(&server, None);
    let response = client
        .search(&scrapgox::PageQuery::new("test", "rust"))
        .unwrap();
    assert_eq!(response.count, 42);
    assert!(response.exists_exact_title_match);
    assert_eq!(response.query.words, vec!["rust"]);
}

#[test]
fn list_command_prints_titles_in_order() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/pages/test/search/query")
        .match_query(paging("foo bar"))
        .match_header("cookie", "connect.sid=cli-token")
        .with_status(200)
        .with_body(pages_body(&["one", "two", "three"]))
        .create();

    let url = server.url();
    let cli = Cli::try_parse_from([
        "scrapgox",
        "--base-url",
        url.as_str(),
        "list",
        "-t",
        "cli-token",
        "test",
        "foo bar",
    ])
    .unwrap();

    let mut out = Vec::new();
    run_with(&cli, |_| None, &mut out).unwrap();

    mock.assert();
    assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\nthree\n");
}

#[test]
fn list_command_fails_on_status_and_prints_nothing() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/pages/private")
        .match_query(Matcher::Any)
        .with_status(401)
        .create();

    let url = server.url();
    let cli = Cli::try_parse_from(["scrapgox", "--base-url", url.as_str(), "l", "private"]).unwrap();

    let mut out = Vec::new();
    let err = run_with(&cli, |_| None, &mut out).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("failed to list pages of `private`"), "{message}");
    assert!(message.contains("401 Unauthorized"), "{message}");
    assert!(out.is_empty());
}
