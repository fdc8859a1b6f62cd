use super::*;
use crate::storage::MemoryStore;

fn item(id: &str, price: f64, quantity: u32) -> CartItem {
    CartItem { product_id: id.to_owned(), name: format!("Product {id}"), price, quantity, image: None }
}

fn empty_cart() -> (CartService, Rc<MemoryStore>) {
    let store = Rc::new(MemoryStore::new());
    (CartService::load(store.clone()), store)
}

fn persisted(store: &MemoryStore) -> Vec<CartItem> {
    serde_json::from_str(&store.get(CART_KEY).unwrap()).unwrap()
}

// =============================================================================
// add_to_cart
// =============================================================================

#[test]
fn adding_same_product_twice_yields_one_line_with_quantity_two() {
    let (mut cart, _) = empty_cart();
    cart.add_to_cart(item("p1", 4.0, 1)).unwrap();
    cart.add_to_cart(item("p1", 4.0, 1)).unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.count(), 2);
}

#[test]
fn new_line_ignores_caller_quantity() {
    let (mut cart, _) = empty_cart();
    cart.add_to_cart(item("p1", 4.0, 7)).unwrap();
    assert_eq!(cart.items()[0].quantity, 1);
}

#[test]
fn lines_keep_insertion_order() {
    let (mut cart, _) = empty_cart();
    for id in ["b", "a", "c"] {
        cart.add_to_cart(item(id, 1.0, 1)).unwrap();
    }
    cart.add_to_cart(item("a", 1.0, 1)).unwrap();
    let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
}

// =============================================================================
// other mutations
// =============================================================================

#[test]
fn update_quantity_sets_and_zero_removes() {
    let (mut cart, _) = empty_cart();
    cart.add_to_cart(item("p1", 2.5, 1)).unwrap();
    cart.add_to_cart(item("p2", 1.0, 1)).unwrap();

    cart.update_quantity("p1", 4).unwrap();
    assert_eq!(cart.count(), 5);
    assert!((cart.total() - 11.0).abs() < 1e-9);

    cart.update_quantity("p1", 0).unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.count(), 1);
}

#[test]
fn update_quantity_unknown_id_is_noop() {
    let (mut cart, _) = empty_cart();
    cart.add_to_cart(item("p1", 1.0, 1)).unwrap();
    cart.update_quantity("missing", 3).unwrap();
    assert_eq!(cart.count(), 1);
}

#[test]
fn remove_and_clear() {
    let (mut cart, store) = empty_cart();
    cart.add_to_cart(item("p1", 1.0, 1)).unwrap();
    cart.add_to_cart(item("p2", 1.0, 1)).unwrap();

    cart.remove_from_cart("p1").unwrap();
    assert_eq!(persisted(&store).len(), 1);

    cart.clear_cart().unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.count(), 0);
    assert!(persisted(&store).is_empty());
}

// =============================================================================
// persistence + observable count
// =============================================================================

#[test]
fn every_mutation_is_persisted_and_reloadable() {
    let (mut cart, store) = empty_cart();
    cart.add_to_cart(item("p1", 3.0, 1)).unwrap();
    cart.add_to_cart(item("p1", 3.0, 1)).unwrap();
    assert_eq!(persisted(&store)[0].quantity, 2);

    let reloaded = CartService::load(store);
    assert_eq!(reloaded.items(), cart.items());
    assert_eq!(reloaded.count(), 2);
}

#[test]
fn stored_cart_uses_camel_case_keys() {
    let (mut cart, store) = empty_cart();
    cart.add_to_cart(item("p1", 3.0, 1)).unwrap();
    let raw = store.get(CART_KEY).unwrap();
    assert!(raw.contains("\"productId\":\"p1\""));
}

#[test]
fn count_subscribers_follow_mutations() {
    let (mut cart, _) = empty_cart();
    let mut rx = cart.subscribe_count();
    cart.add_to_cart(item("p1", 1.0, 1)).unwrap();
    cart.add_to_cart(item("p2", 1.0, 1)).unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), 2);
}

#[test]
fn corrupt_stored_cart_loads_empty() {
    let store = Rc::new(MemoryStore::new());
    store.set(CART_KEY, "oops").unwrap();
    let cart = CartService::load(store);
    assert!(cart.is_empty());
}

#[test]
fn cart_item_from_product() {
    let product = Product {
        id: "m1".into(),
        name: "Ibuprofen".into(),
        price: 6.0,
        category: "Pain".into(),
        image: Some("ibu.png".into()),
        description: None,
        stock: Some(3),
    };
    let line = CartItem::from(&product);
    assert_eq!(line.product_id, "m1");
    assert_eq!(line.quantity, 1);
    assert_eq!(line.image.as_deref(), Some("ibu.png"));
}

// =============================================================================
// overflow
// =============================================================================

#[test]
fn adding_to_a_maxed_line_saturates_instead_of_wrapping() {
    let (mut cart, _) = empty_cart();
    cart.add_to_cart(item("p1", 1.0, 1)).unwrap();
    cart.update_quantity("p1", u32::MAX).unwrap();

    cart.add_to_cart(item("p1", 1.0, 1)).unwrap();
    assert_eq!(cart.items()[0].quantity, u32::MAX);
    assert_eq!(cart.count(), u32::MAX);
}

#[test]
fn count_saturates_across_large_lines() {
    let (mut cart, _) = empty_cart();
    cart.add_to_cart(item("p1", 1.0, 1)).unwrap();
    cart.add_to_cart(item("p2", 1.0, 1)).unwrap();
    cart.update_quantity("p1", u32::MAX).unwrap();
    cart.update_quantity("p2", 5).unwrap();

    assert_eq!(cart.count(), u32::MAX);
    assert_eq!(cart.items().len(), 2);
}
