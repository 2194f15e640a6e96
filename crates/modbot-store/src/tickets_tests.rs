use super::*;

async fn setup_store() -> TicketStore {
    let db = Database::open_in_memory().unwrap();
    db.init_schema().await.unwrap();
    TicketStore::new(db)
}

#[tokio::test]
async fn create_and_get_by_channel() {
    let store = setup_store().await;

    let id = store.create_ticket(1, 100, 7, "alice").await.unwrap();
    assert!(id > 0);

    let ticket = store.get_ticket_by_channel(100).await.unwrap().unwrap();
    assert_eq!(ticket.id, id);
    assert_eq!(ticket.guild_id, 1);
    assert_eq!(ticket.user_id, 7);
    assert_eq!(ticket.username, "alice");
    assert_eq!(ticket.status, TicketStatus::Open);
    assert!(ticket.closed_at.is_none());
    assert!(ticket.closed_by.is_none());
    assert!(ticket.transcript_url.is_none());
}

#[tokio::test]
async fn get_by_unknown_channel_returns_none() {
    let store = setup_store().await;
    assert!(store.get_ticket_by_channel(404).await.unwrap().is_none());
}

#[tokio::test]
async fn close_is_one_way() {
    let store = setup_store().await;
    store.create_ticket(1, 100, 7, "alice").await.unwrap();

    assert!(
        store
            .close_ticket(100, 9, Some("https://example.com/t/1"))
            .await
            .unwrap()
    );
    let closed = store.get_ticket_by_channel(100).await.unwrap().unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);
    assert_eq!(closed.closed_by, Some(9));
    assert_eq!(
        closed.transcript_url.as_deref(),
        Some("https://example.com/t/1")
    );
    let closed_at = closed.closed_at.clone().unwrap();

    // Second close is a no-op.
    assert!(!store.close_ticket(100, 10, None).await.unwrap());
    let again = store.get_ticket_by_channel(100).await.unwrap().unwrap();
    assert_eq!(again.closed_at.as_deref(), Some(closed_at.as_str()));
    assert_eq!(again.closed_by, Some(9));
    assert_eq!(again, closed);
}

#[tokio::test]
async fn close_unknown_channel_returns_false() {
    let store = setup_store().await;
    assert!(!store.close_ticket(100, 9, None).await.unwrap());
}

#[tokio::test]
async fn open_tickets_newest_first() {
    let store = setup_store().await;

    let a = store.create_ticket(1, 100, 7, "alice").await.unwrap();
    let b = store.create_ticket(1, 101, 8, "bob").await.unwrap();
    let c = store.create_ticket(1, 102, 9, "carol").await.unwrap();
    store.create_ticket(2, 200, 7, "alice").await.unwrap();
    store.close_ticket(101, 1, None).await.unwrap();

    let open = store.get_open_tickets(1).await.unwrap();
    let ids: Vec<i64> = open.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![c, a]);
    assert!(!ids.contains(&b));
    assert!(open.iter().all(|t| t.status == TicketStatus::Open));
}

#[tokio::test]
async fn user_tickets_respect_limit() {
    let store = setup_store().await;

    let mut ids = Vec::new();
    for i in 0..12 {
        ids.push(store.create_ticket(1, 100 + i, 7, "alice").await.unwrap());
    }
    store.create_ticket(1, 500, 8, "bob").await.unwrap();

    let tickets = store
        .get_user_tickets(1, 7, DEFAULT_USER_TICKET_LIMIT)
        .await
        .unwrap();
    assert_eq!(tickets.len() as i64, DEFAULT_USER_TICKET_LIMIT);
    assert_eq!(tickets[0].id, *ids.last().unwrap());
    assert!(tickets.iter().all(|t| t.user_id == 7));

    let two = store.get_user_tickets(1, 7, 2).await.unwrap();
    assert_eq!(two.len(), 2);
    assert!(store.get_user_tickets(2, 7, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_user_ticket_limit_is_rejected() {
    let store = setup_store().await;
    store.create_ticket(1, 100, 7, "alice").await.unwrap();

    let result = store.get_user_tickets(1, 7, -1).await;
    assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    assert!(store.get_user_tickets(1, 7, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn reused_channel_resolves_to_latest_ticket() {
    let store = setup_store().await;

    store.create_ticket(1, 100, 7, "alice").await.unwrap();
    store.close_ticket(100, 9, None).await.unwrap();
    let second = store.create_ticket(1, 100, 8, "bob").await.unwrap();

    let ticket = store.get_ticket_by_channel(100).await.unwrap().unwrap();
    assert_eq!(ticket.id, second);
    assert_eq!(ticket.status, TicketStatus::Open);

    // Only the open ticket is affected by a close.
    assert!(store.close_ticket(100, 9, None).await.unwrap());
    assert!(!store.close_ticket(100, 9, None).await.unwrap());
}

#[tokio::test]
async fn participants_add_remove() {
    let store = setup_store().await;
    let ticket = store.create_ticket(1, 100, 7, "alice").await.unwrap();

    assert!(store.add_ticket_participant(ticket, 20, 7).await.unwrap());
    assert!(!store.add_ticket_participant(ticket, 20, 8).await.unwrap());
    assert!(store.add_ticket_participant(ticket, 21, 7).await.unwrap());

    let participants = store.get_ticket_participants(ticket).await.unwrap();
    let users: Vec<i64> = participants.iter().map(|p| p.user_id).collect();
    assert_eq!(users, vec![20, 21]);
    // The duplicate add did not overwrite who added the participant.
    assert_eq!(participants[0].added_by, 7);

    assert!(store.remove_ticket_participant(ticket, 20).await.unwrap());
    assert!(!store.remove_ticket_participant(ticket, 20).await.unwrap());
    assert_eq!(store.get_ticket_participants(ticket).await.unwrap().len(), 1);
}

#[tokio::test]
async fn participants_survive_close() {
    let store = setup_store().await;
    let ticket = store.create_ticket(1, 100, 7, "alice").await.unwrap();
    store.add_ticket_participant(ticket, 20, 7).await.unwrap();

    store.close_ticket(100, 7, None).await.unwrap();
    assert_eq!(store.get_ticket_participants(ticket).await.unwrap().len(), 1);
}

#[tokio::test]
async fn participant_on_missing_ticket_is_an_error() {
    let store = setup_store().await;
    let result = store.add_ticket_participant(999, 20, 7).await;
    assert!(matches!(result, Err(StoreError::Sqlite(_))));
}

#[tokio::test]
async fn stats_add_up() {
    let store = setup_store().await;

    assert_eq!(store.get_ticket_stats(1).await.unwrap(), TicketStats::default());

    for channel in 100..105 {
        store.create_ticket(1, channel, 7, "alice").await.unwrap();
    }
    store.create_ticket(2, 900, 7, "alice").await.unwrap();
    store.close_ticket(100, 1, None).await.unwrap();
    store.close_ticket(101, 1, None).await.unwrap();

    let stats = store.get_ticket_stats(1).await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.open, 3);
    assert_eq!(stats.closed, 2);
    assert_eq!(stats.total, stats.open + stats.closed);
}

#[tokio::test]
async fn unknown_stored_status_is_rejected() {
    let store = setup_store().await;
    store
        .db
        .execute(|conn| {
            conn.execute(
                "INSERT INTO tickets (guild_id, channel_id, user_id, username, created_at, status) \
                 VALUES (1, 100, 7, 'alice', '2024-01-01T00:00:00.000000', 'archived')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

    let result = store.get_ticket_by_channel(100).await;
    assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
}

#[test]
fn status_strings() {
    assert_eq!(TicketStatus::Open.as_str(), "open");
    assert_eq!(TicketStatus::Closed.to_string(), "closed");
    assert_eq!(TicketStatus::parse("closed").unwrap(), TicketStatus::Closed);
    assert!(TicketStatus::parse("pending").is_err());
}
