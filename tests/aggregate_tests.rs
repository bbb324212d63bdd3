//! Aggregate queries: payment amount rollups, per-status and per-type
//! counts, and the count/list consistency property.

use anyhow::Result;
use rust_decimal_macros::dec;
use ticketstore::models::event::EventType;
use ticketstore::models::payment::PaymentStatus;
use ticketstore::repositories::event::EventFilter;
use ticketstore::repositories::payment::{CreatePaymentRequest, PaymentFilter, PaymentSort};
use ticketstore::repositories::{Page, SortOrder};
use uuid::Uuid;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{seed_event, seed_participant, seed_user, setup_client};

async fn seed_payments(
    client: &ticketstore::Client,
) -> Result<(Uuid, Uuid)> {
    let creator = seed_user(client, "Ann", "ann@x.com").await?;
    let event_id = seed_event(client, creator, "Launch Party").await?;
    let participant_id = seed_participant(client, event_id, creator, "Ann").await?;

    let amounts = [
        (dec!(10.00), PaymentStatus::Completed),
        (dec!(2.50), PaymentStatus::Completed),
        (dec!(7.50), PaymentStatus::Pending),
        (dec!(4.00), PaymentStatus::Failed),
    ];
    for (amount, status) in amounts {
        client
            .payments()
            .create(CreatePaymentRequest {
                id: None,
                event_id,
                participant_id,
                amount,
                currency: "KRW".to_string(),
                status,
                paid_at: None,
                initiated_at: None,
            })
            .await?;
    }
    Ok((event_id, participant_id))
}

#[tokio::test]
async fn amount_aggregates_match_the_selection() -> Result<()> {
    let client = setup_client().await?;
    seed_payments(&client).await?;

    let all = client
        .payments()
        .aggregate_amounts(&PaymentFilter::default())
        .await?;
    assert_eq!(all.count, 4);
    assert_eq!(all.sum, Some(dec!(24.00)));
    assert_eq!(all.avg, Some(dec!(6.00)));
    assert_eq!(all.min, Some(dec!(2.50)));
    assert_eq!(all.max, Some(dec!(10.00)));

    let completed = client
        .payments()
        .aggregate_amounts(&PaymentFilter {
            status: Some(PaymentStatus::Completed),
            ..Default::default()
        })
        .await?;
    assert_eq!(completed.count, 2);
    assert_eq!(completed.sum, Some(dec!(12.50)));
    Ok(())
}

#[tokio::test]
async fn status_groups_partition_the_payments() -> Result<()> {
    let client = setup_client().await?;
    seed_payments(&client).await?;

    let groups = client
        .payments()
        .group_by_status(&PaymentFilter::default())
        .await?;
    assert_eq!(groups.len(), 3);

    let total: i64 = groups.iter().map(|g| g.count).sum();
    assert_eq!(total, 4);

    let completed = groups
        .iter()
        .find(|g| g.status == PaymentStatus::Completed)
        .map(|g| g.count);
    assert_eq!(completed, Some(2));
    Ok(())
}

#[tokio::test]
async fn count_agrees_with_find_many() -> Result<()> {
    let client = setup_client().await?;
    let (event_id, _) = seed_payments(&client).await?;

    let filter = PaymentFilter {
        event_id: Some(event_id),
        ..Default::default()
    };
    let listed = client
        .payments()
        .find_many(&filter, PaymentSort::default(), Page::default())
        .await?;
    assert_eq!(listed.len() as u64, client.payments().count(&filter).await?);
    Ok(())
}

#[tokio::test]
async fn event_type_counts_cover_every_event() -> Result<()> {
    let client = setup_client().await?;
    let creator = seed_user(&client, "Ann", "ann@x.com").await?;
    seed_event(&client, creator, "Launch Party").await?;
    seed_event(&client, creator, "Afterparty").await?;

    let counts = client
        .events()
        .count_by_type(&EventFilter::default())
        .await?;
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].event_type, EventType::OneTime);
    assert_eq!(counts[0].count, 2);
    Ok(())
}

#[tokio::test]
async fn pagination_respects_the_hard_cap() -> Result<()> {
    let client = setup_client().await?;
    seed_payments(&client).await?;

    let page = Page {
        limit: 100_000,
        offset: 0,
    };
    let rows = client
        .payments()
        .find_many(
            &PaymentFilter::default(),
            PaymentSort {
                field: ticketstore::repositories::payment::PaymentSortField::Amount,
                direction: SortOrder::Desc,
            },
            page,
        )
        .await?;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].amount, dec!(10.00));
    Ok(())
}
