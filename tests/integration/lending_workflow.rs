//! End-to-end lending workflow against in-memory stores

use lendshare_server::{
    error::{AppError, AvailabilityConflict, RequestViolation},
    models::LendingStatus,
};

use crate::support::{day, MemoryStore};

const U1: i32 = 1;
const U2: i32 = 2;
const U3: i32 = 3;
const ITEM: i32 = 10;

fn marketplace() -> MemoryStore {
    let store = MemoryStore::default();
    store.add_user(U1, "olga");
    store.add_user(U2, "bob");
    store.add_user(U3, "carol");
    store.add_item(ITEM, U1, "Camping tent", true);
    store
}

#[tokio::test]
async fn test_borrow_approve_return_scenario() {
    let store = marketplace();
    let service = store.service();

    let request = service.create(ITEM, U2, day(10), day(14)).await.unwrap();
    assert_eq!(request.status, LendingStatus::Pending);
    assert_eq!(request.borrower_id, U2);
    assert!(request.approved_at.is_none());

    let approved = service
        .update_status(request.id, U1, LendingStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, LendingStatus::Approved);
    assert!(approved.approved_at.is_some());

    let messages = store.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!((messages[0].sender_id, messages[0].recipient_id), (U1, U2));
    assert!(messages[0].content.contains("APPROVED"));

    let err = service.create(ITEM, U3, day(12), day(15)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(AvailabilityConflict::RequestOverlap)));

    let completed = service
        .update_status(request.id, U2, LendingStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, LendingStatus::Completed);
    assert!(completed.returned_at.is_some());
    assert_eq!(completed.approved_at, approved.approved_at);

    let messages = store.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[1].sender_id, messages[1].recipient_id), (U2, U1));
    assert_eq!(
        messages[1].content,
        "The item 'Camping tent' has been marked as RETURNED by bob."
    );

    // Dates are free again once the loan is closed
    let next = service.create(ITEM, U3, day(12), day(15)).await.unwrap();
    assert_eq!(next.status, LendingStatus::Pending);
}

#[tokio::test]
async fn test_creation_validation() {
    let store = marketplace();
    let service = store.service();

    let err = service.create(ITEM, U1, day(1), day(2)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(RequestViolation::SelfBorrow)));

    let err = service.create(ITEM, U2, day(5), day(5)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(RequestViolation::InvalidDateRange)));

    let err = service.create(ITEM, U2, day(6), day(3)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(RequestViolation::InvalidDateRange)));

    let err = service.create(ITEM, U2, day(-1), day(3)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(RequestViolation::PastDate)));

    let err = service.create(999, U2, day(1), day(3)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Starting today is fine
    service.create(ITEM, U2, day(0), day(1)).await.unwrap();
}

#[tokio::test]
async fn test_long_request_on_free_item_is_accepted() {
    let store = marketplace();
    let service = store.service();

    let request = service.create(ITEM, U2, day(1), day(120)).await.unwrap();
    assert_eq!(request.status, LendingStatus::Pending);
    assert_eq!((request.requested_from, request.requested_to), (day(1), day(120)));

    let moved = service.update_dates(request.id, U2, day(2), day(200)).await.unwrap();
    assert_eq!(moved.requested_to, day(200));
}

#[tokio::test]
async fn test_unavailable_and_blocked_items() {
    let store = marketplace();
    store.add_item(11, U1, "Kayak", false);
    store.block(ITEM, day(10), day(20));
    let service = store.service();

    let err = service.create(11, U2, day(1), day(2)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(AvailabilityConflict::ItemUnavailable)));

    let err = service.create(ITEM, U2, day(5), day(10)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(AvailabilityConflict::OwnerBlocked)));

    service.create(ITEM, U2, day(21), day(25)).await.unwrap();
}

#[tokio::test]
async fn test_terminal_requests_are_frozen() {
    let store = marketplace();
    let service = store.service();

    let denied = service.create(ITEM, U2, day(1), day(2)).await.unwrap();
    service
        .update_status(denied.id, U1, LendingStatus::Denied)
        .await
        .unwrap();

    let canceled = service.create(ITEM, U2, day(3), day(4)).await.unwrap();
    service
        .update_status(canceled.id, U2, LendingStatus::Canceled)
        .await
        .unwrap();

    let completed = service.create(ITEM, U2, day(5), day(6)).await.unwrap();
    service
        .update_status(completed.id, U1, LendingStatus::Approved)
        .await
        .unwrap();
    service
        .update_status(completed.id, U1, LendingStatus::Completed)
        .await
        .unwrap();

    let sent = store.messages().len();
    for id in [denied.id, canceled.id, completed.id] {
        for actor in [U1, U2, U3] {
            for status in [LendingStatus::Approved, LendingStatus::Completed, LendingStatus::Canceled] {
                let err = service.update_status(id, actor, status).await.unwrap_err();
                assert!(
                    matches!(err, AppError::InvalidTransition { .. }),
                    "request {id} actor {actor} -> {status}: {err}"
                );
            }
        }
    }
    assert_eq!(store.messages().len(), sent);
}

#[tokio::test]
async fn test_approval_timestamp_is_stable() {
    let store = marketplace();
    let service = store.service();

    let request = service.create(ITEM, U2, day(1), day(3)).await.unwrap();
    let first = service
        .update_status(request.id, U1, LendingStatus::Approved)
        .await
        .unwrap();
    let again = service
        .update_status(request.id, U1, LendingStatus::Approved)
        .await
        .unwrap();

    assert_eq!(again.approved_at, first.approved_at);
    assert!(again.updated_at >= first.updated_at);
    // Re-saving without a status change notifies nobody
    assert_eq!(store.messages().len(), 1);
}

#[tokio::test]
async fn test_on_loan_path_and_notifications() {
    let store = marketplace();
    let service = store.service();

    let request = service.create(ITEM, U2, day(1), day(3)).await.unwrap();
    service
        .update_status(request.id, U1, LendingStatus::Approved)
        .await
        .unwrap();
    let on_loan = service
        .update_status(request.id, U1, LendingStatus::OnLoan)
        .await
        .unwrap();
    assert_eq!(on_loan.status, LendingStatus::OnLoan);

    // A loan in progress cannot be canceled
    let err = service
        .update_status(request.id, U2, LendingStatus::Canceled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let done = service
        .update_status(request.id, U1, LendingStatus::Completed)
        .await
        .unwrap();
    assert!(done.returned_at.is_some());

    let messages = store.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!((messages[1].sender_id, messages[1].recipient_id), (U1, U2));
    assert_eq!((messages[2].sender_id, messages[2].recipient_id), (U1, U2));
    assert!(messages[2].content.contains("RETURNED by olga"));
}

#[tokio::test]
async fn test_guards_on_status_changes() {
    let store = marketplace();
    let service = store.service();

    let request = service.create(ITEM, U2, day(1), day(3)).await.unwrap();

    let err = service
        .update_status(request.id, U2, LendingStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let err = service
        .update_status(request.id, U3, LendingStatus::Denied)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let err = service
        .update_status(request.id, U1, LendingStatus::Canceled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let err = service
        .update_status(404, U1, LendingStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(store.messages().is_empty());
    let unchanged = service.get(request.id, U2).await.unwrap();
    assert_eq!(unchanged.status, LendingStatus::Pending);
}

#[tokio::test]
async fn test_cancel_notifies_owner_even_if_messages_fail() {
    let store = marketplace();
    let service = store.service();

    let request = service.create(ITEM, U2, day(1), day(3)).await.unwrap();
    store.fail_messages();

    let canceled = service
        .update_status(request.id, U2, LendingStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.status, LendingStatus::Canceled);
    assert_eq!(service.get(request.id, U1).await.unwrap().status, LendingStatus::Canceled);
    assert!(store.messages().is_empty());
}

#[tokio::test]
async fn test_update_dates() {
    let store = marketplace();
    let service = store.service();

    let mine = service.create(ITEM, U2, day(1), day(3)).await.unwrap();
    let other = service.create(ITEM, U3, day(10), day(12)).await.unwrap();

    // Moving within its own range is not a conflict with itself
    let moved = service.update_dates(mine.id, U2, day(2), day(4)).await.unwrap();
    assert_eq!((moved.requested_from, moved.requested_to), (day(2), day(4)));
    assert_eq!(moved.status, LendingStatus::Pending);

    let err = service.update_dates(mine.id, U2, day(9), day(11)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(AvailabilityConflict::RequestOverlap)));

    let err = service.update_dates(mine.id, U2, day(5), day(5)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(RequestViolation::InvalidDateRange)));

    let err = service.update_dates(mine.id, U1, day(5), day(6)).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    service
        .update_status(other.id, U1, LendingStatus::Denied)
        .await
        .unwrap();
    let err = service.update_dates(other.id, U3, day(20), day(21)).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    // Denied request no longer holds its dates
    service.update_dates(mine.id, U2, day(9), day(11)).await.unwrap();
}

#[tokio::test]
async fn test_list_for_user_covers_both_roles() {
    let store = marketplace();
    store.add_item(20, U2, "Bike", true);
    let service = store.service();

    let borrowed = service.create(ITEM, U2, day(1), day(2)).await.unwrap();
    let lent = service.create(20, U3, day(1), day(2)).await.unwrap();
    service.create(ITEM, U3, day(5), day(6)).await.unwrap();

    let ids: Vec<i32> = service
        .list_for_user(U2)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&borrowed.id));
    assert!(ids.contains(&lent.id));

    // Owner of ITEM sees both requests on it, once each
    assert_eq!(service.list_for_user(U1).await.unwrap().len(), 2);

    let err = service.get(lent.id, U1).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overlapping_requests_admit_one() {
    let store = marketplace();
    let service = store.service();

    let mut handles = Vec::new();
    for borrower in [U2, U3, U2, U3, U2, U3] {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.create(ITEM, borrower, day(30), day(35)).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(AvailabilityConflict::RequestOverlap)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transitions_apply_once() {
    let store = marketplace();
    let service = store.service();
    let request = service.create(ITEM, U2, day(1), day(3)).await.unwrap();

    let approve = {
        let service = service.clone();
        tokio::spawn(async move { service.update_status(request.id, U1, LendingStatus::Approved).await })
    };
    let deny = {
        let service = service.clone();
        tokio::spawn(async move { service.update_status(request.id, U1, LendingStatus::Denied).await })
    };

    let results = [approve.await.unwrap(), deny.await.unwrap()];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::InvalidTransition { .. }))));
    assert_eq!(store.messages().len(), 1);
}
