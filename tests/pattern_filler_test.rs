mod common;

use auto_apply::config::Timings;
use auto_apply::models::FieldKind;
use auto_apply::services::field_classifier::ProfileField;
use auto_apply::services::pattern_filler::DocumentKind;
use auto_apply::services::PatternFiller;

use common::{profile, FakeBrowser, FakeField, FormPage};

fn contact_page() -> FormPage {
    FormPage::new()
        .field(FakeField::new("Email *", FieldKind::Text).pattern(ProfileField::Email))
        .field(FakeField::new("First name", FieldKind::Text).pattern(ProfileField::FirstName))
        .field(FakeField::new("Country", FieldKind::Dropdown).pattern(ProfileField::Country))
        .field(
            FakeField::new("Are you legally authorized to work in Canada?", FieldKind::Radio)
                .pattern(ProfileField::WorkAuthorization),
        )
        .upload(DocumentKind::Resume)
        .submit()
}

#[tokio::test]
async fn email_is_filled_verbatim_from_profile() {
    let browser = FakeBrowser::on_form(vec![contact_page()]);
    let session = browser.session(Timings::instant());

    let filled = PatternFiller::new().smart_fill(&session, &profile()).await;

    assert_eq!(filled, 5);
    assert_eq!(browser.field_value(0, "Email *").as_deref(), Some("a@b.com"));
    assert_eq!(browser.field_value(0, "First name").as_deref(), Some("Alex"));
    assert_eq!(browser.field_value(0, "Country").as_deref(), Some("Canada"));
    assert_eq!(
        browser
            .field_value(0, "Are you legally authorized to work in Canada?")
            .as_deref(),
        Some("Yes")
    );
    let state = browser.state();
    assert!(state.actions.iter().all(|a| !a.ends_with('=') && !a.contains("=string")));
    assert_eq!(
        state.standalone_form[0].uploads[0].attached.as_deref(),
        Some("/tmp/resume.pdf")
    );
}

#[tokio::test]
async fn dropdown_is_opened_before_selecting() {
    let browser = FakeBrowser::on_form(vec![contact_page()]);
    let session = browser.session(Timings::instant());

    PatternFiller::new().smart_fill(&session, &profile()).await;

    let state = browser.state();
    let open = state.actions.iter().position(|a| a == "click:field:2");
    let select = state.actions.iter().position(|a| a == "select:Country=Canada");
    assert!(open.is_some() && select.is_some());
    assert!(open < select);
}

#[tokio::test]
async fn second_pass_on_filled_page_fills_nothing() {
    let browser = FakeBrowser::on_form(vec![contact_page()]);
    let session = browser.session(Timings::instant());
    let filler = PatternFiller::new();
    let profile = profile();

    let first = filler.smart_fill(&session, &profile).await;
    let second = filler.smart_fill(&session, &profile).await;

    assert!(first > 0);
    assert_eq!(second, 0);
    assert_eq!(browser.count_actions("upload:"), 1);
}

#[tokio::test]
async fn empty_profile_values_are_never_filled() {
    let page = FormPage::new()
        .field(FakeField::new("LinkedIn profile", FieldKind::Text).pattern(ProfileField::LinkedIn));
    let browser = FakeBrowser::on_form(vec![page]);
    let session = browser.session(Timings::instant());
    let mut profile = profile();
    profile.linkedin = Some("   ".to_string());

    let filled = PatternFiller::new().smart_fill(&session, &profile).await;

    assert_eq!(filled, 0);
    assert_eq!(browser.field_value(0, "LinkedIn profile"), None);
    assert_eq!(browser.count_actions("fill:"), 0);
}

#[tokio::test]
async fn candidate_that_reads_as_another_field_is_skipped() {
    // 观察结果把电话输入框当成了邮箱
    let page = FormPage::new()
        .field(FakeField::new("Phone number", FieldKind::Text).pattern(ProfileField::Email));
    let browser = FakeBrowser::on_form(vec![page]);
    let session = browser.session(Timings::instant());

    let filled = PatternFiller::new().smart_fill(&session, &profile()).await;

    assert_eq!(filled, 0);
    assert_eq!(browser.field_value(0, "Phone number"), None);
}

#[test]
fn smart_fill_runs_on_a_blocking_executor() {
    let browser = FakeBrowser::on_form(vec![contact_page()]);
    let session = browser.session(Timings::instant());

    let filled = tokio_test::block_on(PatternFiller::new().smart_fill(&session, &profile()));

    assert_eq!(filled, 5);
}
