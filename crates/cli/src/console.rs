//! Terminal output.

#![allow(clippy::print_stdout)]

use royal_florist_core::{CurrencyCode, User};
use royal_florist_storefront::Destination;
use royal_florist_storefront::models::{Cart, Category, CheckoutReceipt, Product, WishlistItem};
use royal_florist_storefront::notify::{Notice, NoticeLevel, Notifier};

/// Prints notices as they happen.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✔ {}", notice.text),
            NoticeLevel::Error => println!("✘ {}", notice.text),
        }
    }
}

pub fn line(text: &str) {
    println!("{text}");
}

pub fn next(destination: Destination) {
    println!("→ {}", destination.path());
}

pub fn user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  phone:   {}", user.phone.as_deref().unwrap_or("-"));
    match &user.address {
        Some(address) => {
            println!("  address: {}", address.full_address);
            println!(
                "           {} {}, {}, {}",
                address.pincode, address.city, address.state, address.country
            );
        }
        None => println!("  address: -"),
    }
}

pub fn categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
    }
    for category in categories {
        println!("{:<26} {}", category.id, category.name);
    }
}

pub fn products(products: &[Product], currency: CurrencyCode) {
    if products.is_empty() {
        println!("No products.");
    }
    for product in products {
        println!(
            "{:<26} {:>10}  {}",
            product.id,
            product.price.display(currency),
            product.name
        );
    }
}

pub fn cart(cart: &Cart, currency: CurrencyCode) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        println!(
            "{:<26} {:>3} × {:>10} = {:>10}  {}",
            item.product_id,
            item.quantity,
            item.unit_price.display(currency),
            item.item_total.display(currency),
            item.product_name
        );
    }
    println!("Total: {}", cart.total_price.display(currency));
}

pub fn wishlist(items: &[WishlistItem], currency: CurrencyCode) {
    if items.is_empty() {
        println!("No wishlist items.");
    }
    for item in items {
        println!(
            "{:<26} {:>10}  {}",
            item.product_id,
            item.price.map_or_else(|| "-".to_string(), |p| p.display(currency)),
            item.name.as_deref().unwrap_or("")
        );
    }
}

pub fn receipt(receipt: &CheckoutReceipt) {
    println!(
        "Paid {} for order {} (payment {})",
        receipt.amount.display(receipt.currency),
        receipt.order_id,
        receipt.payment_id
    );
}
