use super::*;

fn metadata(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn new_cart_is_empty_with_zero_total() {
    let cart = CartStore::new();
    assert!(cart.is_empty());
    assert_eq!(cart.total(), Zar::ZERO);
    assert_eq!(cart.snapshot(), CartSnapshot::default());
}

#[test]
fn project_and_marketing_items_total_seventeen_thousand() {
    let cart = CartStore::new();
    cart.add_to_cart("Web Project", Zar::from_rands(15_000), ItemCategory::Project, None);
    cart.add_to_cart(
        "TikTok Campaigns",
        Zar::from_rands(2_000),
        ItemCategory::Marketing,
        None,
    );

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total(), Zar::from_rands(17_000));
}

#[test]
fn total_matches_sum_regardless_of_insertion_order() {
    let prices = [1_500u64, 250, 40_000, 0, 1_999, 7];

    let forward = CartStore::new();
    for (idx, price) in prices.iter().enumerate() {
        forward.add_to_cart(format!("item {idx}"), Zar::from_cents(*price), "project", None);
    }

    let backward = CartStore::new();
    for (idx, price) in prices.iter().enumerate().rev() {
        backward.add_to_cart(format!("item {idx}"), Zar::from_cents(*price), "project", None);
    }

    let expected = Zar::from_cents(prices.iter().sum());
    assert_eq!(forward.total(), expected);
    assert_eq!(backward.total(), expected);
}

#[test]
fn items_keep_insertion_order_and_unique_ids() {
    let cart = CartStore::new();
    let first = cart.add_to_cart("first", Zar::from_rands(1), "project", None);
    let second = cart.add_to_cart("second", Zar::from_rands(1), "project", None);
    let third = cart.add_to_cart("second", Zar::from_rands(1), "project", None);

    let ids: Vec<_> = cart.items().into_iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![first, second, third]);
    assert_ne!(second, third);
}

#[test]
fn remove_present_item_drops_exactly_one() {
    let cart = CartStore::new();
    cart.add_to_cart("a", Zar::from_rands(100), "project", None);
    let target = cart.add_to_cart("b", Zar::from_rands(200), "marketing", None);
    cart.add_to_cart("c", Zar::from_rands(300), "project", None);

    assert!(cart.remove_from_cart(target));
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total(), Zar::from_rands(400));
    assert!(cart.get(target).is_none());

    let names: Vec<_> = cart.items().into_iter().map(|item| item.name).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn remove_unknown_id_is_a_no_op() {
    let cart = CartStore::new();
    cart.add_to_cart("a", Zar::from_rands(100), "project", None);
    let before = cart.snapshot();

    assert!(!cart.remove_from_cart(CartItemId::generate()));
    assert_eq!(cart.snapshot(), before);
}

#[test]
fn clear_empties_cart_and_zeroes_total() {
    let cart = CartStore::new();
    cart.add_to_cart("a", Zar::from_rands(100), "project", None);
    cart.add_to_cart("b", Zar::from_rands(50), "marketing", None);

    cart.clear_cart();
    assert!(cart.items().is_empty());
    assert_eq!(cart.total(), Zar::ZERO);
}

#[test]
fn metadata_is_kept_on_the_item() {
    let cart = CartStore::new();
    let id = cart.add_to_cart(
        "Email Campaigns Marketing Package",
        Zar::from_rands(1_000),
        ItemCategory::Marketing,
        Some(metadata(&[("duration", "30 days")])),
    );

    let item = cart.get(id).expect("item");
    assert_eq!(item.metadata.get("duration").map(String::as_str), Some("30 days"));
    assert_eq!(item.category, ItemCategory::Marketing);
}

#[test]
fn category_totals_follow_first_appearance() {
    let cart = CartStore::new();
    cart.add_to_cart("m1", Zar::from_rands(2_000), "marketing", None);
    cart.add_to_cart("p1", Zar::from_rands(15_000), "project", None);
    cart.add_to_cart("m2", Zar::from_rands(1_000), "marketing", None);

    assert_eq!(
        cart.totals_by_category(),
        vec![
            (ItemCategory::Marketing, Zar::from_rands(3_000)),
            (ItemCategory::Project, Zar::from_rands(15_000)),
        ]
    );
}

#[tokio::test]
async fn observers_receive_snapshot_after_each_mutation() {
    let cart = CartStore::new();
    let mut updates = cart.subscribe();

    let id = cart.add_to_cart("Web Project", Zar::from_rands(15_000), "project", None);
    let added = updates.recv().await.expect("add update");
    assert_eq!(added.items.len(), 1);
    assert_eq!(added.total, Zar::from_rands(15_000));

    cart.add_to_cart("TikTok Campaigns", Zar::from_rands(2_000), "marketing", None);
    let second = updates.recv().await.expect("second update");
    assert_eq!(second.total, Zar::from_rands(17_000));

    cart.remove_from_cart(id);
    let removed = updates.recv().await.expect("remove update");
    assert_eq!(removed.items.len(), 1);
    assert_eq!(removed.total, Zar::from_rands(2_000));

    cart.clear_cart();
    let cleared = updates.recv().await.expect("clear update");
    assert!(cleared.items.is_empty());
    assert_eq!(cleared.total, Zar::ZERO);
}

#[tokio::test]
async fn unknown_remove_does_not_notify() {
    let cart = CartStore::new();
    let mut updates = cart.subscribe();

    cart.remove_from_cart(CartItemId::generate());
    assert!(matches!(
        updates.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}
