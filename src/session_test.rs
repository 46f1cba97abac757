// Unit tests for scoped sessions

use super::*;
use crate::errors::ProbeError;
use crate::fake_driver::FakeDriver;
use tempfile::TempDir;

fn screenshots_in(dir: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn options(dir: &TempDir) -> SessionOptions {
    SessionOptions {
        name: "insider_qa_jobs_istanbul".to_string(),
        screenshots_dir: dir.path().join("screenshots"),
        wait: WaitConfig::default(),
    }
}

#[tokio::test]
async fn test_success_quits_without_screenshot() {
    let dir = TempDir::new().unwrap();
    let driver = FakeDriver::new("https://insiderone.com/", "Insider One");
    let quit = driver.quit_flag();

    let title = run_session(driver, &options(&dir), async |toolkit: &Toolkit<FakeDriver>| {
        toolkit.title().await
    })
    .await
    .unwrap();

    assert_eq!(title, "Insider One");
    assert!(quit.get());
    assert!(screenshots_in(&dir.path().join("screenshots")).is_empty());
}

#[tokio::test]
async fn test_failure_writes_exactly_one_screenshot_and_quits() {
    let dir = TempDir::new().unwrap();
    let driver = FakeDriver::new("https://insiderone.com/", "Insider One");
    let quit = driver.quit_flag();

    let err = run_session(driver, &options(&dir), async |_: &Toolkit<FakeDriver>| {
        Err::<(), _>(ProbeError::AssertionFailed("Homepage did not load".into()))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::AssertionFailed(_)));
    assert!(quit.get());

    let files = screenshots_in(&dir.path().join("screenshots"));
    assert_eq!(files.len(), 1, "{:?}", files);
    assert!(files[0].starts_with("FAIL_insider_qa_jobs_istanbul_"));
    assert!(files[0].ends_with(".png"));
}

#[tokio::test]
async fn test_screenshot_failure_does_not_mask_error() {
    let dir = TempDir::new().unwrap();
    let driver = FakeDriver::new("https://insiderone.com/", "Insider One");
    driver.fail_screenshots();
    let quit = driver.quit_flag();

    let err = run_session(driver, &options(&dir), async |_: &Toolkit<FakeDriver>| {
        Err::<(), _>(ProbeError::NoJobsFound)
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ProbeError::NoJobsFound));
    assert!(quit.get());
    assert!(screenshots_in(&dir.path().join("screenshots")).is_empty());
}
