pub mod auth;
pub mod errors;
pub mod order;
pub mod product;
pub mod user;

pub use auth::{RefreshRequest, RefreshedToken, TokenPair, TokenRequest};
pub use errors::ErrorResponse;
pub use order::{
    CreateOrderRequest, Order, OrderItem, OrderLineRequest, OrderStatus, PaymentMethod,
    UpdateStatusRequest,
};
pub use product::{Category, Product, ProductForm, ProductId};
pub use user::{
    ApprovalAction, ChangePasswordRequest, DetailResponse, Profile, ProfileUpdateRequest,
    RegisterRequest, Role, SupplierRequest, User, UserId, WorkerApprovalRequest,
    WorkerRegistrationRequest,
};
