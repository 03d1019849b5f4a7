use std::collections::HashSet;

use chrono::{Duration, Utc};
use uuid::Uuid;

use aiborn_codes::domain::types::{CODE_ALPHABET, MAX_GENERATE_ROUNDS, MAX_REDEMPTIONS_LIMIT};
use aiborn_codes::error::CodesServiceError;
use aiborn_codes::export::{CSV_HEADER, codes_to_csv};
use aiborn_codes::usecase::generate::{GenerateCodesInput, GenerateCodesUseCase};
use aiborn_domain::code::{CodeStatus, CodeType};
use aiborn_domain::member::MemberRole;

use crate::helpers::{MockStore, admin, reader, test_member, test_org};

fn input(count: u32, actor: aiborn_codes::domain::types::Actor) -> GenerateCodesInput {
    GenerateCodesInput {
        count,
        code_type: CodeType::VipPreview,
        description: Some("  Spring book fair  ".to_owned()),
        max_redemptions: Some(1),
        valid_from: None,
        valid_until: None,
        org_id: None,
        actor,
        now: Utc::now(),
    }
}

fn usecase(store: &MockStore) -> GenerateCodesUseCase<MockStore, MockStore> {
    GenerateCodesUseCase {
        codes: store.clone(),
        orgs: store.clone(),
    }
}

#[tokio::test]
async fn should_generate_distinct_codes_in_alphabet() {
    let store = MockStore::default();
    let actor = admin();

    let codes = usecase(&store).execute(input(200, actor)).await.unwrap();

    assert_eq!(codes.len(), 200);
    let distinct: HashSet<_> = codes.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(distinct.len(), 200, "codes must be unique");
    for code in &codes {
        assert_eq!(code.code.len(), 6);
        assert!(code.code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert_eq!(code.status, CodeStatus::Active);
        assert_eq!(code.redemption_count, 0);
        assert_eq!(code.created_by, actor.user_id);
        assert_eq!(code.description.as_deref(), Some("Spring book fair"));
    }
    assert_eq!(store.codes().len(), 200);
}

#[tokio::test]
async fn should_default_valid_from_to_now() {
    let store = MockStore::default();
    let request = input(1, admin());
    let now = request.now;

    let codes = usecase(&store).execute(request).await.unwrap();
    assert_eq!(codes[0].valid_from, now);
    assert_eq!(codes[0].valid_until, None);
}

#[tokio::test]
async fn should_reroll_when_candidates_are_taken() {
    let store = MockStore::default();
    store.set_taken_rounds(2);

    let codes = usecase(&store).execute(input(5, admin())).await.unwrap();

    assert_eq!(codes.len(), 5);
    assert_eq!(store.find_taken_calls(), 3);
}

#[tokio::test]
async fn should_give_up_after_bounded_rerolls() {
    let store = MockStore::default();
    store.set_taken_rounds(MAX_GENERATE_ROUNDS + 1);

    let result = usecase(&store).execute(input(5, admin())).await;

    assert!(
        matches!(result, Err(CodesServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert!(store.codes().is_empty());
}

#[tokio::test]
async fn should_reject_count_out_of_range() {
    let store = MockStore::default();
    for count in [0, 1001] {
        let result = usecase(&store).execute(input(count, admin())).await;
        assert!(
            matches!(result, Err(CodesServiceError::InvalidRequest(_))),
            "count {count} should be rejected, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_zero_max_redemptions() {
    let mut request = input(1, admin());
    request.max_redemptions = Some(0);

    let result = usecase(&MockStore::default()).execute(request).await;
    assert!(matches!(result, Err(CodesServiceError::InvalidRequest(_))));
}

#[tokio::test]
async fn should_reject_max_redemptions_beyond_storage_range() {
    let store = MockStore::default();
    let mut request = input(1, admin());
    request.max_redemptions = Some(3_000_000_000);

    let result = usecase(&store).execute(request).await;
    assert!(matches!(result, Err(CodesServiceError::InvalidRequest(_))));
    assert!(store.codes().is_empty());

    let mut request = input(1, admin());
    request.max_redemptions = Some(MAX_REDEMPTIONS_LIMIT);
    let codes = usecase(&store).execute(request).await.unwrap();
    assert_eq!(codes[0].max_redemptions, Some(i32::MAX as u32));
}

#[tokio::test]
async fn should_reject_window_ending_before_start() {
    let mut request = input(1, admin());
    request.valid_from = Some(request.now + Duration::days(2));
    request.valid_until = Some(request.now + Duration::days(1));

    let result = usecase(&MockStore::default()).execute(request).await;
    assert!(matches!(result, Err(CodesServiceError::InvalidRequest(_))));
}

#[tokio::test]
async fn should_forbid_reader_without_organization() {
    let store = MockStore::default();

    let result = usecase(&store).execute(input(1, reader())).await;
    assert!(matches!(result, Err(CodesServiceError::Forbidden)));
}

#[tokio::test]
async fn should_let_org_manager_generate_scoped_codes() {
    let store = MockStore::default();
    let org = test_org("acme-press");
    let manager = reader();
    store.seed_org(
        org.clone(),
        vec![test_member(org.id, manager.user_id, MemberRole::Admin)],
    );

    let mut request = input(3, manager);
    request.org_id = Some(org.id);
    let codes = usecase(&store).execute(request).await.unwrap();

    assert_eq!(codes.len(), 3);
    assert!(codes.iter().all(|c| c.org_id == Some(org.id)));
}

#[tokio::test]
async fn should_forbid_plain_member_and_other_org_manager() {
    let store = MockStore::default();
    let org = test_org("acme-press");
    let other = test_org("other-house");
    let member = reader();
    let other_manager = reader();
    store.seed_org(
        org.clone(),
        vec![test_member(org.id, member.user_id, MemberRole::Member)],
    );
    store.seed_org(
        other.clone(),
        vec![test_member(other.id, other_manager.user_id, MemberRole::Owner)],
    );

    for actor in [member, other_manager] {
        let mut request = input(1, actor);
        request.org_id = Some(org.id);
        let result = usecase(&store).execute(request).await;
        assert!(
            matches!(result, Err(CodesServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_report_unknown_organization_to_admin() {
    let mut request = input(1, admin());
    request.org_id = Some(Uuid::new_v4());

    let result = usecase(&MockStore::default()).execute(request).await;
    assert!(matches!(result, Err(CodesServiceError::OrganizationNotFound)));
}

#[tokio::test]
async fn should_render_generated_batch_as_csv() {
    let store = MockStore::default();
    let codes = usecase(&store).execute(input(4, admin())).await.unwrap();

    let csv = codes_to_csv(&codes);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], CSV_HEADER);
    for (line, code) in lines[1..].iter().zip(&codes) {
        assert!(line.starts_with(&format!("{},VIP_PREVIEW,ACTIVE,1,", code.code)));
    }
}
