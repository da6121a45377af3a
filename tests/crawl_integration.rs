//! End-to-end crawl tests against a mock proceedings site.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use proceedings_crawler::{
    CrawlConfig, CrawlError, Crawler, MetadataExtractor, PaperMetadata, PdfLink,
};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn homepage(years: &[u16]) -> String {
    let items: String = years
        .iter()
        .map(|y| format!(r#"<li><a href="/paper_files/paper/{y}">Advances in NeurIPS (NeurIPS {y})</a></li>"#))
        .collect();
    format!(r#"<html><body><a href="/admin/login/">Login</a><ul>{items}</ul></body></html>"#)
}

fn listing(year: u16, hashes: &[&str]) -> String {
    let items: String = hashes
        .iter()
        .map(|h| {
            format!(
                r#"<li><a href="/paper_files/paper/{year}/hash/{h}-Abstract.html">Paper {h}</a></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><a href="/">Home</a><ul class="paper-list">{items}</ul></body></html>"#
    )
}

fn detail(year: u16, hash: &str, with_pdf: bool) -> String {
    let pdf = if with_pdf {
        format!(r#"<a href="/paper_files/paper/{year}/file/{hash}-Paper.pdf">Paper</a>"#)
    } else {
        String::new()
    };
    format!(
        r#"<html><body>
             <h4>Title {hash}</h4>
             <a href="/paper_files/paper/{year}/file/{hash}-Supplemental.zip">Supplemental</a>
             {pdf}
             <h4>Authors</h4>
             <i>Author {hash}</i>
             <h4>Abstract</h4>
             <p>Abstract of {hash}.</p>
           </body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_paper(server: &MockServer, year: u16, hash: &str, with_pdf: bool) {
    mount_page(
        server,
        &format!("/paper_files/paper/{year}/hash/{hash}-Abstract.html"),
        detail(year, hash, with_pdf),
    )
    .await;
    if with_pdf {
        Mock::given(method("GET"))
            .and(path(format!("/paper_files/paper/{year}/file/{hash}-Paper.pdf")))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(format!("%PDF {hash}").into_bytes()),
            )
            .mount(server)
            .await;
    }
}

fn config(server: &MockServer, output: &Path) -> CrawlConfig {
    CrawlConfig {
        base_url: Url::parse(&server.uri()).expect("valid mock URL"),
        output_dir: output.to_path_buf(),
        concurrency: 4,
        max_attempts: 2,
        retry_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..CrawlConfig::default()
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("result file exists");
    let mut rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.expect("valid row").iter().map(str::to_string).collect())
        .collect();
    rows.sort();
    rows
}

#[tokio::test]
async fn test_crawl_two_papers_produces_two_rows_and_two_files() {
    let server = MockServer::start().await;
    mount_page(&server, "/", homepage(&[2024, 2020])).await;
    mount_page(&server, "/paper_files/paper/2020", listing(2020, &["aaa", "bbb"])).await;
    mount_paper(&server, 2020, "aaa", true).await;
    mount_paper(&server, 2020, "bbb", true).await;

    let temp = TempDir::new().expect("failed to create temp dir");
    let crawler = Crawler::new(config(&server, temp.path())).expect("valid config");
    let stats = crawler.run().await.expect("crawl should succeed");

    assert_eq!(stats.years_dispatched(), 1);
    assert_eq!(stats.papers_processed(), 2);
    assert_eq!(stats.pdfs_downloaded(), 2);
    assert_eq!(stats.rows_written(), 2);

    let csv_path = temp.path().join("output.csv");
    let header = std::fs::read_to_string(&csv_path).expect("result file exists");
    assert!(header.starts_with("Year,Title,Authors,Abstract,PDF Link"));

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        vec![
            "2020".to_string(),
            "Title aaa".to_string(),
            "Author aaa".to_string(),
            "Abstract of aaa.".to_string(),
            format!("{}/paper_files/paper/2020/file/aaa-Paper.pdf", server.uri()),
        ]
    );
    assert_eq!(rows[1][1], "Title bbb");

    let year_dir = temp.path().join("2020");
    assert_eq!(std::fs::read_dir(&year_dir).expect("year dir").count(), 2);
    assert_eq!(
        std::fs::read(year_dir.join("aaa-Paper.pdf")).expect("pdf written"),
        b"%PDF aaa"
    );
    assert!(!temp.path().join("2024").exists());
}

#[tokio::test]
async fn test_homepage_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("failed to create temp dir");
    let crawler = Crawler::new(config(&server, temp.path())).expect("valid config");
    let result = crawler.run().await;

    match result {
        Err(CrawlError::HomepageUnavailable(unavailable)) => assert_eq!(unavailable.attempts, 2),
        other => panic!("expected HomepageUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_pdf_link_writes_sentinel_and_skips_download() {
    let server = MockServer::start().await;
    mount_page(&server, "/", homepage(&[2021])).await;
    mount_page(&server, "/paper_files/paper/2021", listing(2021, &["ccc"])).await;
    mount_paper(&server, 2021, "ccc", false).await;

    let temp = TempDir::new().expect("failed to create temp dir");
    let stats = Crawler::new(config(&server, temp.path()))
        .expect("valid config")
        .run()
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.pdfs_missing(), 1);
    assert_eq!(stats.pdfs_downloaded(), 0);

    let rows = read_rows(&temp.path().join("output.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][4], "N/A");
    assert!(!temp.path().join("2021").exists());
}

#[tokio::test]
async fn test_failed_paper_and_year_are_dropped_without_aborting() {
    let server = MockServer::start().await;
    mount_page(&server, "/", homepage(&[2019, 2022])).await;
    Mock::given(method("GET"))
        .and(path("/paper_files/paper/2019"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(&server, "/paper_files/paper/2022", listing(2022, &["good", "lost"])).await;
    mount_paper(&server, 2022, "good", true).await;
    Mock::given(method("GET"))
        .and(path("/paper_files/paper/2022/hash/lost-Abstract.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("failed to create temp dir");
    let stats = Crawler::new(config(&server, temp.path()))
        .expect("valid config")
        .run()
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.years_dispatched(), 2);
    assert_eq!(stats.years_failed(), 1);
    assert_eq!(stats.papers_processed(), 1);
    assert_eq!(stats.papers_failed(), 1);

    let rows = read_rows(&temp.path().join("output.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "Title good");
}

#[tokio::test]
async fn test_failed_pdf_download_still_writes_row() {
    let server = MockServer::start().await;
    mount_page(&server, "/", homepage(&[2023])).await;
    mount_page(&server, "/paper_files/paper/2023", listing(2023, &["ddd"])).await;
    mount_page(
        &server,
        "/paper_files/paper/2023/hash/ddd-Abstract.html",
        detail(2023, "ddd", true),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/paper_files/paper/2023/file/ddd-Paper.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().expect("failed to create temp dir");
    let stats = Crawler::new(config(&server, temp.path()))
        .expect("valid config")
        .run()
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.pdfs_failed(), 1);
    assert_eq!(stats.rows_written(), 1);
    assert!(!temp.path().join("2023").join("ddd-Paper.pdf").exists());
}

#[tokio::test]
async fn test_single_slot_pool_completes_every_job() {
    let server = MockServer::start().await;
    let years = [2019, 2020, 2021];
    mount_page(&server, "/", homepage(&years)).await;
    for year in years {
        let hashes = [format!("a{year}"), format!("b{year}")];
        let refs: Vec<&str> = hashes.iter().map(String::as_str).collect();
        mount_page(&server, &format!("/paper_files/paper/{year}"), listing(year, &refs)).await;
        for hash in &refs {
            mount_paper(&server, year, hash, true).await;
        }
    }

    let temp = TempDir::new().expect("failed to create temp dir");
    let config = CrawlConfig {
        concurrency: 1,
        ..config(&server, temp.path())
    };
    let stats = Crawler::new(config)
        .expect("valid config")
        .run()
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.years_dispatched(), 3);
    assert_eq!(stats.papers_dispatched(), 6);
    assert_eq!(stats.rows_written(), 6);
    for year in years {
        let count = std::fs::read_dir(temp.path().join(year.to_string()))
            .expect("year dir")
            .count();
        assert_eq!(count, 2);
    }
}

#[tokio::test]
async fn test_rerun_appends_without_duplicate_header() {
    let server = MockServer::start().await;
    mount_page(&server, "/", homepage(&[2020])).await;
    mount_page(&server, "/paper_files/paper/2020", listing(2020, &["eee"])).await;
    mount_paper(&server, 2020, "eee", true).await;

    let temp = TempDir::new().expect("failed to create temp dir");
    for _ in 0..2 {
        Crawler::new(config(&server, temp.path()))
            .expect("valid config")
            .run()
            .await
            .expect("crawl should succeed");
    }

    let contents = std::fs::read_to_string(temp.path().join("output.csv")).expect("result file");
    assert_eq!(contents.lines().filter(|l| l.starts_with("Year,")).count(), 1);
    assert_eq!(read_rows(&temp.path().join("output.csv")).len(), 2);
    assert_eq!(
        std::fs::read_dir(temp.path().join("2020")).expect("year dir").count(),
        1
    );
}

struct FixedExtractor;

impl MetadataExtractor for FixedExtractor {
    fn extract(&self, _html: &str, _base: &Url) -> PaperMetadata {
        PaperMetadata {
            title: Some("Fixed".to_string()),
            authors: vec!["One".to_string(), "Two".to_string()],
            abstract_text: None,
            pdf: PdfLink::Absent,
        }
    }
}

#[tokio::test]
async fn test_custom_extractor_replaces_structural_rules() {
    let server = MockServer::start().await;
    mount_page(&server, "/", homepage(&[2020])).await;
    mount_page(&server, "/paper_files/paper/2020", listing(2020, &["fff"])).await;
    mount_paper(&server, 2020, "fff", true).await;

    let temp = TempDir::new().expect("failed to create temp dir");
    let stats = Crawler::new(config(&server, temp.path()))
        .expect("valid config")
        .with_extractor(Arc::new(FixedExtractor))
        .run()
        .await
        .expect("crawl should succeed");

    assert_eq!(stats.pdfs_missing(), 1);
    let rows = read_rows(&temp.path().join("output.csv"));
    assert_eq!(
        rows[0],
        vec!["2020", "Fixed", "One, Two", "N/A", "N/A"]
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_invalid_config_rejected_by_constructor() {
    let config = CrawlConfig {
        start_year: 2023,
        end_year: 2019,
        ..CrawlConfig::default()
    };
    assert!(matches!(Crawler::new(config), Err(CrawlError::Config(_))));
}
