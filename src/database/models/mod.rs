pub mod attribute;
pub mod category;
pub mod color;
pub mod coupon;
pub mod customer;
pub mod order;
pub mod product;

pub use attribute::{Attribute, AttributeInput, AttributeValue, AttributeValueInput, Attributes};
pub use category::{Categories, Category, CategoryInput};
pub use color::{Color, ColorInput, Colors};
pub use coupon::{Coupon, CouponInput, CouponValues, Coupons};
pub use customer::{Customer, CustomerInput, Customers};
pub use order::{Order, OrderDetail, OrderStatusInput, Orders};
pub use product::{Product, ProductInput, ProductVariant, ProductVariantInput, Products};
