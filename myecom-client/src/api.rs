use reqwest::{
    Method, RequestBuilder,
    multipart::{Form, Part},
};
use shared::{
    config::Config,
    models::{
        ApprovalAction, Category, ChangePasswordRequest, CreateOrderRequest, DetailResponse, Order,
        OrderStatus, Product, ProductForm, ProductId, ProfileUpdateRequest, RefreshRequest,
        RefreshedToken, RegisterRequest, SupplierRequest, TokenPair, TokenRequest,
        UpdateStatusRequest, User, UserId, WorkerApprovalRequest, WorkerRegistrationRequest,
    },
};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::{error::ClientResult, http::HttpAdapter};

/// Typed client for the storefront REST API.
///
/// One method per endpoint; every call goes through the shared [`HttpAdapter`]
/// so the bearer credential installed by the session store is applied.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: HttpAdapter,
}

impl ApiClient {
    /// Create a client for the `<origin>/api/` base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> ClientResult<Self> {
        Ok(Self::from_adapter(HttpAdapter::new(base_url, timeout)?))
    }

    /// Create a client from resolved configuration.
    ///
    /// # Errors
    /// Returns an error if the API base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let base = config.api_base()?;
        Self::new(base, Duration::from_secs(config.request_timeout_secs))
    }

    #[must_use]
    pub const fn from_adapter(http: HttpAdapter) -> Self {
        Self { http }
    }

    #[must_use]
    pub const fn http(&self) -> &HttpAdapter {
        &self.http
    }

    /// `true` while the session store has a bearer token installed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.http.has_auth_token()
    }

    pub(crate) fn set_auth_token(&self, token: Option<&str>) {
        self.http.set_auth_token(token);
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        self.http.request(method, path)
    }

    // --- authentication -------------------------------------------------

    pub(crate) async fn obtain_token(&self, credentials: &TokenRequest) -> ClientResult<TokenPair> {
        let request = self.request(Method::POST, "auth/token/")?.json(credentials);
        self.http.send_json(request).await
    }

    pub(crate) async fn refresh_token(
        &self,
        refresh: &RefreshRequest,
    ) -> ClientResult<RefreshedToken> {
        let request = self.request(Method::POST, "auth/token/refresh/")?.json(refresh);
        self.http.send_json(request).await
    }

    /// Identity record for the current bearer token (`users/me/`).
    ///
    /// # Errors
    /// Returns [`ClientError::Unauthorized`] when no valid token is installed.
    pub async fn current_user(&self) -> ClientResult<User> {
        let request = self.request(Method::GET, "users/me/")?;
        self.http.send_json(request).await
    }

    // --- account --------------------------------------------------------

    /// Create a client account.
    ///
    /// # Errors
    /// Returns [`ClientError::Validation`] with the server's field errors when
    /// the form is rejected (for example mismatched passwords).
    pub async fn register(&self, form: &RegisterRequest) -> ClientResult<DetailResponse> {
        let request = self.request(Method::POST, "users/register/")?.json(form);
        self.http.send_json(request).await
    }

    /// Update the authenticated user's names and email.
    ///
    /// # Errors
    /// Returns an error if the request fails or the server rejects the update.
    pub async fn update_profile(&self, update: &ProfileUpdateRequest) -> ClientResult<User> {
        let request = self.request(Method::PATCH, "users/me/update/")?.json(update);
        self.http.send_json(request).await
    }

    /// Change the authenticated user's password.
    ///
    /// # Errors
    /// Returns [`ClientError::Validation`] when the old password is wrong.
    pub async fn change_password(
        &self,
        change: &ChangePasswordRequest,
    ) -> ClientResult<DetailResponse> {
        let request = self
            .request(Method::POST, "users/change-password/")?
            .json(change);
        self.http.send_json(request).await
    }

    /// Ask for supplier status; the account stays unapproved until an admin acts.
    ///
    /// # Errors
    /// Returns an error if the request fails or the server refuses it.
    pub async fn request_supplier(&self, age: u32) -> ClientResult<DetailResponse> {
        let request = self
            .request(Method::POST, "users/request-supplier/")?
            .json(&SupplierRequest { age });
        self.http.send_json(request).await
    }

    // --- catalog --------------------------------------------------------

    /// All products, newest first.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        let request = self.request(Method::GET, "products/")?;
        self.http.send_json(request).await
    }

    /// A single product snapshot.
    ///
    /// # Errors
    /// Returns an error if the request fails or the product does not exist.
    pub async fn get_product(&self, id: ProductId) -> ClientResult<Product> {
        let request = self.request(Method::GET, &format!("products/{id}/"))?;
        self.http.send_json(request).await
    }

    /// Products whose name, description or category matches any word of `query`.
    ///
    /// A blank query matches nothing and is answered without a request.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn search_products(&self, query: &str) -> ClientResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request(Method::GET, "products/search/")?
            .query(&[("q", query)]);
        self.http.send_json(request).await
    }

    /// List a new product (multipart, optional image).
    ///
    /// # Errors
    /// Returns [`ClientError::Validation`] for rejected fields (for example a
    /// duplicate name) and [`ClientError::Storage`] if the image cannot be read.
    pub async fn create_product(&self, form: &ProductForm) -> ClientResult<Product> {
        let body = product_form(form).await?;
        let request = self.request(Method::POST, "products/")?.multipart(body);
        self.http.send_json(request).await
    }

    /// Partially update a product (multipart, optional image).
    ///
    /// # Errors
    /// Returns an error if the request fails or the server rejects the form.
    pub async fn update_product(&self, id: ProductId, form: &ProductForm) -> ClientResult<Product> {
        let body = product_form(form).await?;
        let request = self
            .request(Method::PATCH, &format!("products/{id}/"))?
            .multipart(body);
        self.http.send_json(request).await
    }

    /// Delete a product.
    ///
    /// # Errors
    /// Returns an error if the request fails or the caller does not own the product.
    pub async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        let request = self.request(Method::DELETE, &format!("products/{id}/"))?;
        self.http.send_empty(request).await
    }

    /// All product categories.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        let request = self.request(Method::GET, "categories/")?;
        self.http.send_json(request).await
    }

    // --- orders ---------------------------------------------------------

    /// Orders visible to the caller: all for admins, their own for suppliers.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        let request = self.request(Method::GET, "orders/")?;
        self.http.send_json(request).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    /// Returns an error if the request fails or the caller may not manage orders.
    pub async fn update_order_status(&self, id: u64, status: OrderStatus) -> ClientResult<Order> {
        let request = self
            .request(Method::POST, &format!("orders/{id}/update_status/"))?
            .json(&UpdateStatusRequest { status });
        self.http.send_json(request).await
    }

    /// Flag an order as seen on the dashboard.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn mark_order_seen(&self, id: u64) -> ClientResult<()> {
        let request = self.request(Method::PATCH, &format!("orders/{id}/mark_as_seen/"))?;
        self.http.send_empty(request).await
    }

    /// The authenticated user's order history.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn my_orders(&self) -> ClientResult<Vec<Order>> {
        let request = self.request(Method::GET, "my-orders/")?;
        self.http.send_json(request).await
    }

    /// Place an order.
    ///
    /// # Errors
    /// Returns an error if the request fails or the server rejects the order.
    pub async fn create_order(&self, order: &CreateOrderRequest) -> ClientResult<Order> {
        debug!(lines = order.items.len(), "placing order");
        let request = self.request(Method::POST, "create-order/")?.json(order);
        self.http.send_json(request).await
    }

    // --- user administration -------------------------------------------

    /// All user accounts (admin only).
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        let request = self.request(Method::GET, "users/")?;
        self.http.send_json(request).await
    }

    /// Create a supplier account awaiting approval (admin only).
    ///
    /// # Errors
    /// Returns an error if the request fails or the username is taken.
    pub async fn register_worker(&self, worker: &WorkerRegistrationRequest) -> ClientResult<User> {
        let request = self
            .request(Method::POST, "users/workers/register/")?
            .json(worker);
        self.http.send_json(request).await
    }

    /// Approve or reject a supplier (admin only).
    ///
    /// # Errors
    /// Returns an error if the request fails or the user is not a supplier.
    pub async fn set_worker_approval(
        &self,
        id: UserId,
        action: ApprovalAction,
    ) -> ClientResult<DetailResponse> {
        let request = self
            .request(Method::POST, &format!("users/workers/{id}/approve/"))?
            .json(&WorkerApprovalRequest { action });
        self.http.send_json(request).await
    }

    /// Delete a user account (admin only).
    ///
    /// # Errors
    /// Returns an error if the request fails or the account is a superuser.
    pub async fn delete_user(&self, id: UserId) -> ClientResult<()> {
        let request = self.request(Method::DELETE, &format!("users/{id}/delete/"))?;
        self.http.send_empty(request).await
    }
}

async fn product_form(form: &ProductForm) -> ClientResult<Form> {
    let mut body = Form::new();
    for (name, value) in form.text_fields() {
        body = body.text(name, value);
    }
    if let Some(path) = &form.image {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
        body = body.part("image", Part::bytes(bytes).file_name(file_name));
    }
    Ok(body)
}
