//! Plain-text rendering of cart snapshots for the terminal.

use shopcart_core::{CartItem, CartState, Price};

/// Write a rendered block to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    println!("{text}");
}

/// One cart line: `#id name (variant) xqty @ unit = subtotal`.
#[must_use]
pub fn render_line(item: &CartItem) -> String {
    let variant = item
        .variant_label()
        .map(|label| format!(" ({label})"))
        .unwrap_or_default();

    format!(
        "#{} {}{variant} x{} @ {} = {}",
        item.id, item.product_name, item.quantity, item.unit_price, item.sub_total
    )
}

/// The whole cart, or a short line when there is nothing to show.
#[must_use]
pub fn render_cart(state: &CartState) -> String {
    let Some(cart) = state.cart() else {
        return "Không có giỏ hàng (chưa đăng nhập)".to_string();
    };
    if cart.is_empty() {
        return "Giỏ hàng trống".to_string();
    }

    let mut lines: Vec<String> = cart.items.iter().map(render_line).collect();
    lines.push(format!("Tổng số lượng: {}", state.cart_count()));
    lines.push(format!("Tổng tiền: {}", cart.total_amount));
    lines.join("\n")
}

/// Success notice plus the badge count after a mutation.
#[must_use]
pub fn render_notice(notice: &str, state: &CartState) -> String {
    format!("{notice} ({} sản phẩm trong giỏ)", state.cart_count())
}

/// Selected lines and what they would cost.
#[must_use]
pub fn render_checkout(items: &[CartItem], total: Price, all_selected: bool) -> String {
    if items.is_empty() {
        return "Chưa chọn sản phẩm nào".to_string();
    }

    let mut lines: Vec<String> = items.iter().map(render_line).collect();
    if all_selected {
        lines.push("(đã chọn tất cả)".to_string());
    }
    lines.push(format!("Thanh toán: {total}"));
    lines.join("\n")
}
