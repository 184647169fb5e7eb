mod common;

use auto_apply::models::{FieldKind, JobStatus};
use auto_apply::orchestrator::apply_to_jobs;

use common::{instant_config, job, profile, FakeBrowser, FakeField, FormPage, Site};

const ACME: &str = "https://careers.acme.test/jobs";
const BROKEN: &str = "https://careers.broken.test/jobs";
const EMPTY: &str = "https://careers.empty.test/jobs";

fn simple_form() -> Vec<FormPage> {
    vec![FormPage::new()
        .field(FakeField::new("Email *", FieldKind::Text))
        .submit()]
}

#[tokio::test]
async fn job_without_entry_url_is_skipped() {
    let browser = FakeBrowser::new();
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", None), job("Data Intern", Some("   "))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    for result in &summary.results {
        assert_eq!(result.status, JobStatus::Skipped);
        assert!(result.reason.as_deref().unwrap_or_default().contains("entry URL"));
    }
    assert!(browser.state().actions.is_empty());
}

#[tokio::test]
async fn failure_in_one_job_does_not_affect_the_others() {
    let browser = FakeBrowser::new();
    browser.add_site(ACME, Site::with_form(simple_form()));
    browser.add_site(
        BROKEN,
        Site {
            fail_on_locate: true,
            ..Site::with_form(simple_form())
        },
    );
    browser.add_site(
        EMPTY,
        Site {
            job_on_page: None,
            ..Site::with_form(simple_form())
        },
    );
    let session = browser.session(instant_config().timings);
    let jobs = [
        job("Backend Intern", Some(ACME)),
        job("Backend Intern", Some(BROKEN)),
        job("Backend Intern", Some(EMPTY)),
    ];

    let summary = apply_to_jobs(&session, &jobs, &profile(), &instant_config()).await;

    assert_eq!((summary.applied, summary.failed, summary.skipped), (1, 1, 1));
    let statuses: Vec<JobStatus> = summary.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Applied, JobStatus::Failed, JobStatus::Skipped]
    );
    assert!(summary.results[1]
        .reason
        .as_deref()
        .unwrap_or_default()
        .contains("listing page failed to render"));
    assert_eq!(
        summary.results[2].reason.as_deref(),
        Some("job not found on source page")
    );
    assert_eq!(browser.state().submit_clicks, 0);
}

#[tokio::test]
async fn panic_during_a_job_is_recorded_as_failed() {
    let browser = FakeBrowser::new();
    browser.add_site(
        BROKEN,
        Site {
            panic_on_locate: true,
            ..Site::with_form(simple_form())
        },
    );
    browser.add_site(ACME, Site::with_form(simple_form()));
    let session = browser.session(instant_config().timings);
    let jobs = [
        job("Backend Intern", Some(BROKEN)),
        job("Backend Intern", Some(ACME)),
    ];

    let summary = apply_to_jobs(&session, &jobs, &profile(), &instant_config()).await;

    assert_eq!(summary.results[0].status, JobStatus::Failed);
    assert_eq!(
        summary.results[0].reason.as_deref(),
        Some("panic: listing widget crashed")
    );
    assert_eq!(summary.results[1].status, JobStatus::Applied);
}

#[tokio::test]
async fn locator_pages_through_listings() {
    let browser = FakeBrowser::new();
    browser.add_site(
        ACME,
        Site {
            listing_pages: 3,
            job_on_page: Some(3),
            ..Site::with_form(simple_form())
        },
    );
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", Some(ACME))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.applied, 1);
    assert_eq!(browser.count_actions("click:pagination"), 2);
}

#[tokio::test]
async fn locator_stops_at_the_listing_page_ceiling() {
    let browser = FakeBrowser::new();
    browser.add_site(
        ACME,
        Site {
            listing_pages: 10,
            job_on_page: Some(7),
            ..Site::with_form(simple_form())
        },
    );
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", Some(ACME))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(browser.count_actions("click:pagination"), 4);
}

#[tokio::test]
async fn missing_apply_control_skips_the_job() {
    let browser = FakeBrowser::new();
    browser.add_site(
        ACME,
        Site {
            has_apply_control: false,
            ..Site::with_form(simple_form())
        },
    );
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", Some(ACME))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.results[0].status, JobStatus::Skipped);
    assert_eq!(summary.results[0].reason.as_deref(), Some("no apply control found"));
}

#[tokio::test]
async fn form_behind_a_second_apply_button_is_entered() {
    let browser = FakeBrowser::new();
    browser.add_site(
        ACME,
        Site {
            needs_form_entry: true,
            ..Site::with_form(simple_form())
        },
    );
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", Some(ACME))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.applied, 1);
    assert_eq!(browser.count_actions("click:entry"), 1);
}

#[tokio::test]
async fn partial_form_is_reported_as_failed_with_reason() {
    let stuck = vec![FormPage::new().field(FakeField::new("Custom question", FieldKind::Text).stubborn())];
    let browser = FakeBrowser::new();
    browser.add_site(ACME, Site::with_form(stuck));
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", Some(ACME))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.failed, 1);
    assert!(summary.results[0]
        .reason
        .as_deref()
        .unwrap_or_default()
        .starts_with("form partially completed: "));
}

#[tokio::test]
async fn unreachable_entry_url_fails_the_job() {
    let browser = FakeBrowser::new();
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", Some("https://gone.test/jobs"))],
        &profile(),
        &instant_config(),
    )
    .await;

    assert_eq!(summary.failed, 1);
    assert!(summary.results[0]
        .reason
        .as_deref()
        .unwrap_or_default()
        .contains("unreachable"));
}

#[tokio::test]
async fn summary_serializes_for_the_report() {
    let browser = FakeBrowser::new();
    let session = browser.session(instant_config().timings);

    let summary = apply_to_jobs(
        &session,
        &[job("Backend Intern", None)],
        &profile(),
        &instant_config(),
    )
    .await;
    let json = serde_json::to_value(&summary).expect("汇总应能序列化");

    assert_eq!(json["skipped"], 1);
    assert_eq!(json["results"][0]["status"], "skipped");
    assert_eq!(json["results"][0]["job"]["title"], "Backend Intern");
}
