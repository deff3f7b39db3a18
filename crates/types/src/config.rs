use url::Url;

/// Runtime configuration for the storefront service.
///
/// Built once at startup from the manifest and environment, then shared
/// read-only across request handlers.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Gateway endpoint the browser payment form is submitted to.
    pub gateway_base_url: Url,
    /// Frontend origin for post-payment redirects.
    pub frontend_url: Url,
    /// Public base URL of this service, used to derive the callback URL.
    pub backend_url: Url,
    /// Accept callbacks that carry no hash field at all. Off by default;
    /// exists for gateway sandboxes that post unsigned callbacks.
    pub allow_unsigned_callbacks: bool,
}

impl StorefrontConfig {
    /// Where the gateway posts payment outcomes (`surl` and `furl`).
    pub fn callback_url(&self) -> Url {
        join_path(&self.backend_url, "v1/payments/callback")
    }

    pub fn success_redirect_base(&self) -> Url {
        join_path(&self.frontend_url, "payment/success")
    }

    pub fn failure_redirect_base(&self) -> Url {
        join_path(&self.frontend_url, "payment/failure")
    }
}

/// Append `path` below `base`, keeping any path prefix the base carries.
fn join_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(path.split('/'));
    }
    url
}
