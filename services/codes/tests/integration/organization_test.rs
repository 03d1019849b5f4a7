use chrono::Utc;
use uuid::Uuid;

use aiborn_codes::domain::types::{Actor, AddMemberOutcome};
use aiborn_codes::error::CodesServiceError;
use aiborn_codes::usecase::organization::{
    AddMemberInput, AddMemberUseCase, CreateOrganizationInput, CreateOrganizationUseCase,
    ListMembersUseCase, RemoveMemberUseCase,
};
use aiborn_domain::member::{MemberRole, MemberStatus};

use crate::helpers::{MockStore, admin, reader, test_member, test_org};

struct Fixture {
    store: MockStore,
    org_id: Uuid,
    owner: Actor,
    org_admin: Actor,
    member: Actor,
}

fn fixture() -> Fixture {
    let store = MockStore::default();
    let org = test_org("acme-press");
    let (owner, org_admin, member) = (reader(), reader(), reader());
    store.seed_org(
        org.clone(),
        vec![
            test_member(org.id, owner.user_id, MemberRole::Owner),
            test_member(org.id, org_admin.user_id, MemberRole::Admin),
            test_member(org.id, member.user_id, MemberRole::Member),
        ],
    );
    Fixture {
        store,
        org_id: org.id,
        owner,
        org_admin,
        member,
    }
}

fn add(org_id: Uuid, user_id: Uuid, role: MemberRole, actor: Actor) -> AddMemberInput {
    AddMemberInput {
        org_id,
        user_id,
        role,
        actor,
        now: Utc::now(),
    }
}

#[tokio::test]
async fn should_create_organization_with_creator_as_owner() {
    let store = MockStore::default();
    let creator = reader();
    let uc = CreateOrganizationUseCase {
        orgs: store.clone(),
    };

    let org = uc
        .execute(CreateOrganizationInput {
            name: " Acme Press ".to_owned(),
            slug: "acme-press".to_owned(),
            actor: creator,
            now: Utc::now(),
        })
        .await
        .unwrap();

    assert_eq!(org.name, "Acme Press");
    let owner = store.member(org.id, creator.user_id).unwrap();
    assert_eq!(owner.role, MemberRole::Owner);
    assert_eq!(owner.status, MemberStatus::Active);
}

#[tokio::test]
async fn should_reject_invalid_or_taken_slug() {
    let store = MockStore::default();
    let uc = CreateOrganizationUseCase {
        orgs: store.clone(),
    };
    let create = |slug: &str| CreateOrganizationInput {
        name: "Acme".to_owned(),
        slug: slug.to_owned(),
        actor: reader(),
        now: Utc::now(),
    };

    let invalid = uc.execute(create("Acme_Press")).await;
    assert!(matches!(invalid, Err(CodesServiceError::InvalidRequest(_))));

    uc.execute(create("acme")).await.unwrap();
    let taken = uc.execute(create("acme")).await;
    assert!(matches!(taken, Err(CodesServiceError::OrganizationAlreadyExists)));
}

#[tokio::test]
async fn should_add_and_report_existing_member() {
    let f = fixture();
    let uc = AddMemberUseCase {
        orgs: f.store.clone(),
    };
    let newcomer = Uuid::new_v4();

    let (member, outcome) = uc
        .execute(add(f.org_id, newcomer, MemberRole::Member, f.org_admin))
        .await
        .unwrap();
    assert_eq!(outcome, AddMemberOutcome::Added);
    assert_eq!(member.role, MemberRole::Member);

    let (_, outcome) = uc
        .execute(add(f.org_id, newcomer, MemberRole::Admin, f.owner))
        .await
        .unwrap();
    assert_eq!(outcome, AddMemberOutcome::AlreadyMember);
    assert_eq!(
        f.store.member(f.org_id, newcomer).unwrap().role,
        MemberRole::Member,
        "an existing member is left unchanged"
    );
}

#[tokio::test]
async fn should_reactivate_removed_member_with_new_role() {
    let f = fixture();
    RemoveMemberUseCase {
        orgs: f.store.clone(),
    }
    .execute(f.org_id, f.member.user_id, f.owner)
    .await
    .unwrap();

    let (member, outcome) = AddMemberUseCase {
        orgs: f.store.clone(),
    }
    .execute(add(f.org_id, f.member.user_id, MemberRole::Admin, f.owner))
    .await
    .unwrap();

    assert_eq!(outcome, AddMemberOutcome::Reactivated);
    assert_eq!(member.role, MemberRole::Admin);
    assert_eq!(member.status, MemberStatus::Active);
}

#[tokio::test]
async fn should_refuse_owner_role_and_non_managers() {
    let f = fixture();
    let uc = AddMemberUseCase {
        orgs: f.store.clone(),
    };

    let owner_role = uc
        .execute(add(f.org_id, Uuid::new_v4(), MemberRole::Owner, f.owner))
        .await;
    assert!(matches!(owner_role, Err(CodesServiceError::InvalidRequest(_))));

    let by_member = uc
        .execute(add(f.org_id, Uuid::new_v4(), MemberRole::Member, f.member))
        .await;
    assert!(matches!(by_member, Err(CodesServiceError::Forbidden)));

    let missing_org = uc
        .execute(add(Uuid::new_v4(), Uuid::new_v4(), MemberRole::Member, admin()))
        .await;
    assert!(matches!(missing_org, Err(CodesServiceError::OrganizationNotFound)));
}

#[tokio::test]
async fn should_not_let_other_org_manager_add_members() {
    let f = fixture();
    let other = test_org("other-house");
    let other_owner = reader();
    f.store.seed_org(
        other.clone(),
        vec![test_member(other.id, other_owner.user_id, MemberRole::Owner)],
    );

    let result = AddMemberUseCase {
        orgs: f.store.clone(),
    }
    .execute(add(f.org_id, Uuid::new_v4(), MemberRole::Member, other_owner))
    .await;
    assert!(matches!(result, Err(CodesServiceError::Forbidden)));
}

#[tokio::test]
async fn should_remove_member_but_never_owner() {
    let f = fixture();
    let uc = RemoveMemberUseCase {
        orgs: f.store.clone(),
    };

    uc.execute(f.org_id, f.member.user_id, f.org_admin)
        .await
        .unwrap();
    assert_eq!(
        f.store.member(f.org_id, f.member.user_id).unwrap().status,
        MemberStatus::Removed
    );

    let again = uc.execute(f.org_id, f.member.user_id, f.org_admin).await;
    assert!(matches!(again, Err(CodesServiceError::MemberNotFound)));

    let owner = uc.execute(f.org_id, f.owner.user_id, f.org_admin).await;
    assert!(matches!(owner, Err(CodesServiceError::Forbidden)));
    let owner = uc.execute(f.org_id, f.owner.user_id, admin()).await;
    assert!(matches!(owner, Err(CodesServiceError::Forbidden)));
}

#[tokio::test]
async fn should_list_active_members_to_members_only() {
    let f = fixture();
    RemoveMemberUseCase {
        orgs: f.store.clone(),
    }
    .execute(f.org_id, f.member.user_id, f.owner)
    .await
    .unwrap();
    let uc = ListMembersUseCase {
        orgs: f.store.clone(),
    };

    let members = uc.execute(f.org_id, f.org_admin).await.unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|m| m.status == MemberStatus::Active));

    let removed = uc.execute(f.org_id, f.member).await;
    assert!(matches!(removed, Err(CodesServiceError::Forbidden)));
    let outsider = uc.execute(f.org_id, reader()).await;
    assert!(matches!(outsider, Err(CodesServiceError::Forbidden)));
    assert_eq!(uc.execute(f.org_id, admin()).await.unwrap().len(), 2);
}
