use dmrt_domain::role::Role;
use dmrt_domain::submission::SubmissionStatus;
use dmrt_testing::auth::MockSession;
use uuid::Uuid;

use dmrt_workflow::error::WorkflowError;
use dmrt_workflow::usecase::submission::{
    CreateSubmissionInput, CreateSubmissionUseCase, GetSubmissionUseCase,
    ListSubmissionsUseCase, TransitionCommand,
};

use crate::helpers::*;

fn as_user(email: &str, role: Role) -> Option<dmrt_auth_types::session::Session> {
    Some(MockSession::new(email, role).session())
}

fn decide(approved: bool, comment: Option<&str>) -> TransitionCommand {
    TransitionCommand::Decide {
        approved,
        comment: comment.map(str::to_owned),
    }
}

// ── Create / read ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_draft_owned_by_session_email() {
    let repo = MockSubmissionRepo::empty();
    let store = repo.submissions_handle();

    let id = CreateSubmissionUseCase { submissions: repo }
        .execute(
            as_user(ALICE, Role::TeamMember),
            CreateSubmissionInput {
                notes: "Night search on Bleaklow, missing walker found safe".to_owned(),
                final_post_text: Some("Team were called out last night...".to_owned()),
            },
        )
        .await
        .unwrap();

    let store = store.lock().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store[0].id, id);
    assert_eq!(store[0].submitted_by_email, ALICE);
    assert_eq!(store[0].status, SubmissionStatus::Draft);
    assert!(store[0].final_post_text.is_some());
}

#[tokio::test]
async fn should_require_session_to_create() {
    let result = CreateSubmissionUseCase {
        submissions: MockSubmissionRepo::empty(),
    }
    .execute(
        None,
        CreateSubmissionInput {
            notes: "notes".to_owned(),
            final_post_text: None,
        },
    )
    .await;

    assert!(matches!(result, Err(WorkflowError::Unauthenticated)));
}

#[tokio::test]
async fn should_reject_blank_or_oversized_notes() {
    let usecase = CreateSubmissionUseCase {
        submissions: MockSubmissionRepo::empty(),
    };

    for notes in ["   ".to_owned(), "x".repeat(10_001)] {
        let result = usecase
            .execute(
                as_user(ALICE, Role::TeamMember),
                CreateSubmissionInput {
                    notes,
                    final_post_text: None,
                },
            )
            .await;
        assert!(matches!(result, Err(WorkflowError::InvalidInput("notes"))));
    }
}

#[tokio::test]
async fn should_show_submission_to_owner_pro_and_leader_only() {
    let s = submission(ALICE, SubmissionStatus::AwaitingPro);
    let id = s.id;
    let usecase = GetSubmissionUseCase {
        submissions: MockSubmissionRepo::new(vec![s]),
    };

    for (email, role) in [
        (ALICE, Role::TeamMember),
        (PRO, Role::Pro),
        (LEADER_1, Role::Leader),
    ] {
        assert!(usecase.execute(as_user(email, role), id).await.is_ok(), "{email}");
    }

    let other = usecase.execute(as_user(BOB, Role::TeamMember), id).await;
    assert!(matches!(other, Err(WorkflowError::Forbidden)));

    let anonymous = usecase.execute(None, id).await;
    assert!(matches!(anonymous, Err(WorkflowError::Unauthenticated)));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_submission() {
    let result = GetSubmissionUseCase {
        submissions: MockSubmissionRepo::empty(),
    }
    .execute(as_user(PRO, Role::Pro), Uuid::now_v7())
    .await;

    assert!(matches!(result, Err(WorkflowError::SubmissionNotFound)));
}

#[tokio::test]
async fn should_list_by_status_for_pro() {
    let usecase = ListSubmissionsUseCase {
        submissions: MockSubmissionRepo::new(vec![
            submission(ALICE, SubmissionStatus::AwaitingPro),
            submission(BOB, SubmissionStatus::Draft),
            submission(BOB, SubmissionStatus::AwaitingPro),
        ]),
    };

    let awaiting = usecase
        .execute(as_user(PRO, Role::Pro), Some(SubmissionStatus::AwaitingPro))
        .await
        .unwrap();
    assert_eq!(awaiting.len(), 2);

    let all = usecase.execute(as_user(LEADER_1, Role::Leader), None).await.unwrap();
    assert_eq!(all.len(), 3);

    let member = usecase.execute(as_user(ALICE, Role::TeamMember), None).await;
    assert!(matches!(member, Err(WorkflowError::Forbidden)));
}

// ── Workflow ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_walk_the_approval_path_handing_off_at_each_step() {
    let s = submission(ALICE, SubmissionStatus::Draft);
    let id = s.id;
    let repo = MockSubmissionRepo::new(vec![s]);
    let store = repo.submissions_handle();
    let codes_repo = MockAuthCodeRepo::empty();
    let codes = codes_repo.codes_handle();
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();
    let usecase = transition_usecase(repo, codes_repo, notifier);

    // Owner hands to the PRO.
    let status = usecase
        .execute(as_user(ALICE, Role::TeamMember), id, TransitionCommand::MarkReady)
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::AwaitingPro);
    {
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec![PRO.to_owned()]);
        assert_eq!(sent[0].subject, "New DMRT Post Ready for Review");
        assert!(sent[0].link.starts_with(&format!("{BASE_URL}/pro?code=")));
        let codes = codes.lock().unwrap();
        assert_eq!(codes[0].role, Role::Pro);
        assert_eq!(codes[0].code, code_in(&sent[0].link));
    }

    // PRO edits and asks the leaders.
    let status = usecase
        .execute(
            as_user(PRO, Role::Pro),
            id,
            TransitionCommand::SendForApproval {
                edited_post_text: Some("Edited post text".to_owned()),
            },
        )
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::AwaitingLeader);
    {
        let sent = sent.lock().unwrap();
        let leader_mail: Vec<_> = sent[1..].iter().collect();
        assert_eq!(leader_mail.len(), 2);
        assert_eq!(leader_mail[0].to, vec![LEADER_1.to_owned()]);
        assert_eq!(leader_mail[1].to, vec![LEADER_2.to_owned()]);
        for mail in &leader_mail {
            assert!(mail.link.starts_with(&format!("{BASE_URL}/approve/{id}?code=")));
        }
        let codes = codes.lock().unwrap();
        let leader_codes: Vec<_> = codes.iter().filter(|c| c.role == Role::Leader).collect();
        assert_eq!(leader_codes.len(), 2);
        assert!(leader_codes.iter().all(|c| c.submission_id == Some(id)));
        assert_eq!(
            store.lock().unwrap()[0].edited_by_pro.as_deref(),
            Some("Edited post text")
        );
    }

    // A leader approves with a comment.
    let status = usecase
        .execute(
            as_user(LEADER_2, Role::Leader),
            id,
            decide(true, Some("Good to go")),
        )
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::AwaitingProToPost);
    {
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[3].to, vec![PRO.to_owned()]);
        assert_eq!(sent[3].subject, "Post Approved - Ready to Post");
        let history = store.lock().unwrap()[0].leader_approvals.clone();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].leader_email, LEADER_2);
        assert!(history[0].approved);
        assert_eq!(history[0].comment.as_deref(), Some("Good to go"));
        assert_eq!(history[0].submission_id, id);
    }

    // PRO posts; nobody else is waiting.
    let status = usecase
        .execute(as_user(PRO, Role::Pro), id, TransitionCommand::Post)
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::Posted);
    assert_eq!(sent.lock().unwrap().len(), 4);
    let stored = store.lock().unwrap()[0].clone();
    assert_eq!(stored.status, SubmissionStatus::Posted);
    assert!(stored.posted_at.is_some());
}

#[tokio::test]
async fn should_allow_pro_to_post_directly_from_review() {
    let mut s = submission(ALICE, SubmissionStatus::AwaitingPro);
    s.final_post_text = Some("Team were called out to Kinder Scout...".to_owned());
    let id = s.id;
    let usecase = transition_usecase(
        MockSubmissionRepo::new(vec![s]),
        MockAuthCodeRepo::empty(),
        MockNotifier::new(),
    );

    let status = usecase
        .execute(as_user(PRO, Role::Pro), id, TransitionCommand::Post)
        .await
        .unwrap();
    assert_eq!(status, SubmissionStatus::Posted);
}

#[tokio::test]
async fn should_refuse_to_post_without_text() {
    let s = submission(ALICE, SubmissionStatus::AwaitingProToPost);
    let id = s.id;
    let repo = MockSubmissionRepo::new(vec![s]);
    let store = repo.submissions_handle();
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();
    let usecase = transition_usecase(repo, MockAuthCodeRepo::empty(), notifier);

    let result = usecase
        .execute(as_user(PRO, Role::Pro), id, TransitionCommand::Post)
        .await;

    assert!(matches!(
        result,
        Err(WorkflowError::InvalidInput("final_post_text"))
    ));
    let stored = store.lock().unwrap()[0].clone();
    assert_eq!(stored.status, SubmissionStatus::AwaitingProToPost);
    assert!(stored.posted_at.is_none());
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_notify_pro_on_rejection() {
    let s = submission(ALICE, SubmissionStatus::AwaitingLeader);
    let id = s.id;
    let repo = MockSubmissionRepo::new(vec![s]);
    let store = repo.submissions_handle();
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();
    let usecase = transition_usecase(repo, MockAuthCodeRepo::empty(), notifier);

    let status = usecase
        .execute(
            as_user(LEADER_1, Role::Leader),
            id,
            decide(false, Some("Casualty identifiable in photo")),
        )
        .await
        .unwrap();

    assert_eq!(status, SubmissionStatus::Rejected);
    let stored = store.lock().unwrap()[0].clone();
    assert_eq!(stored.leader_approvals.len(), 1);
    let decision = &stored.leader_approvals[0];
    assert_eq!(decision.leader_email, LEADER_1);
    assert!(!decision.approved);
    assert_eq!(
        decision.comment.as_deref(),
        Some("Casualty identifiable in photo")
    );
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec![PRO.to_owned()]);
    assert_eq!(sent[0].subject, "Post Rejected");

    let again = usecase
        .execute(as_user(LEADER_1, Role::Leader), id, decide(true, None))
        .await;
    assert!(matches!(again, Err(WorkflowError::InvalidTransition)));
}

#[tokio::test]
async fn only_owner_may_mark_ready() {
    let s = submission(ALICE, SubmissionStatus::Draft);
    let id = s.id;
    let usecase = transition_usecase(
        MockSubmissionRepo::new(vec![s]),
        MockAuthCodeRepo::empty(),
        MockNotifier::new(),
    );

    for (email, role) in [(BOB, Role::TeamMember), (PRO, Role::Pro), (LEADER_1, Role::Leader)] {
        let result = usecase
            .execute(as_user(email, role), id, TransitionCommand::MarkReady)
            .await;
        assert!(matches!(result, Err(WorkflowError::Forbidden)), "{email}");
    }

    let anonymous = usecase.execute(None, id, TransitionCommand::MarkReady).await;
    assert!(matches!(anonymous, Err(WorkflowError::Unauthenticated)));
}

#[tokio::test]
async fn should_enforce_minimum_role_per_action() {
    let s = submission(ALICE, SubmissionStatus::AwaitingPro);
    let id = s.id;
    let usecase = transition_usecase(
        MockSubmissionRepo::new(vec![s]),
        MockAuthCodeRepo::empty(),
        MockNotifier::new(),
    );

    let member = usecase
        .execute(
            as_user(ALICE, Role::TeamMember),
            id,
            TransitionCommand::SendForApproval {
                edited_post_text: None,
            },
        )
        .await;
    assert!(matches!(member, Err(WorkflowError::Forbidden)));

    let pro_approving = usecase
        .execute(as_user(PRO, Role::Pro), id, decide(true, None))
        .await;
    assert!(matches!(pro_approving, Err(WorkflowError::Forbidden)));
}

#[tokio::test]
async fn should_reject_out_of_order_transitions() {
    let draft = submission(ALICE, SubmissionStatus::Draft);
    let awaiting_pro = submission(ALICE, SubmissionStatus::AwaitingPro);
    let (draft_id, awaiting_pro_id) = (draft.id, awaiting_pro.id);
    let repo = MockSubmissionRepo::new(vec![draft, awaiting_pro]);
    let store = repo.submissions_handle();
    let usecase = transition_usecase(repo, MockAuthCodeRepo::empty(), MockNotifier::new());

    let post_draft = usecase
        .execute(as_user(PRO, Role::Pro), draft_id, TransitionCommand::Post)
        .await;
    assert!(matches!(post_draft, Err(WorkflowError::InvalidTransition)));

    let approve_unsent = usecase
        .execute(as_user(LEADER_1, Role::Leader), awaiting_pro_id, decide(true, None))
        .await;
    assert!(matches!(approve_unsent, Err(WorkflowError::InvalidTransition)));

    let store = store.lock().unwrap();
    assert_eq!(store[0].status, SubmissionStatus::Draft);
    assert_eq!(store[1].status, SubmissionStatus::AwaitingPro);
}

#[tokio::test]
async fn should_return_not_found_before_transition() {
    let usecase = transition_usecase(
        MockSubmissionRepo::empty(),
        MockAuthCodeRepo::empty(),
        MockNotifier::new(),
    );

    let result = usecase
        .execute(as_user(PRO, Role::Pro), Uuid::now_v7(), TransitionCommand::Post)
        .await;
    assert!(matches!(result, Err(WorkflowError::SubmissionNotFound)));
}

#[tokio::test]
async fn racing_transitions_apply_once() {
    let s = submission(ALICE, SubmissionStatus::AwaitingLeader);
    let id = s.id;
    let notifier = MockNotifier::new();
    let sent = notifier.sent_handle();
    let usecase = transition_usecase(
        MockSubmissionRepo::new(vec![s]),
        MockAuthCodeRepo::empty(),
        notifier,
    );

    let (approve, reject) = tokio::join!(
        usecase.execute(as_user(LEADER_1, Role::Leader), id, decide(true, None)),
        usecase.execute(as_user(LEADER_2, Role::Leader), id, decide(false, None)),
    );

    assert!(approve.is_ok() != reject.is_ok());
    let loser = if approve.is_ok() { reject } else { approve };
    assert!(matches!(loser, Err(WorkflowError::InvalidTransition)));
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_status_when_hand_off_mail_fails() {
    let s = submission(ALICE, SubmissionStatus::Draft);
    let id = s.id;
    let repo = MockSubmissionRepo::new(vec![s]);
    let store = repo.submissions_handle();
    let usecase = transition_usecase(repo, MockAuthCodeRepo::empty(), MockNotifier::failing());

    let result = usecase
        .execute(as_user(ALICE, Role::TeamMember), id, TransitionCommand::MarkReady)
        .await;

    assert!(matches!(result, Err(WorkflowError::NotificationFailed(_))));
    assert_eq!(store.lock().unwrap()[0].status, SubmissionStatus::AwaitingPro);
}

#[tokio::test]
async fn should_reject_oversized_leader_comment() {
    let s = submission(ALICE, SubmissionStatus::AwaitingLeader);
    let id = s.id;
    let usecase = transition_usecase(
        MockSubmissionRepo::new(vec![s]),
        MockAuthCodeRepo::empty(),
        MockNotifier::new(),
    );

    let comment = "x".repeat(2_001);
    let result = usecase
        .execute(as_user(LEADER_1, Role::Leader), id, decide(false, Some(&comment)))
        .await;
    assert!(matches!(result, Err(WorkflowError::InvalidInput("comment"))));
}
