//! Notices shown to shoppers after cart operations.
//!
//! Failure notices are fallbacks: a message supplied by the cart service
//! always takes precedence.

pub const ADDED: &str = "Đã thêm vào giỏ hàng";
pub const UPDATED: &str = "Đã cập nhật số lượng";
pub const REMOVED: &str = "Đã xóa sản phẩm khỏi giỏ hàng";
pub const CLEARED: &str = "Đã xóa toàn bộ giỏ hàng";

pub const FETCH_FAILED: &str = "Không thể tải giỏ hàng";
pub const COUNT_FAILED: &str = "Không thể tải số lượng sản phẩm trong giỏ hàng";
pub const ADD_FAILED: &str = "Không thể thêm vào giỏ hàng";
pub const UPDATE_FAILED: &str = "Không thể cập nhật số lượng";
pub const REMOVE_FAILED: &str = "Không thể xóa sản phẩm";
pub const CLEAR_FAILED: &str = "Không thể xóa giỏ hàng";
