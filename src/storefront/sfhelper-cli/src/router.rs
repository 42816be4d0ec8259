//! Route table: maps URL paths to screens.

use std::fmt;

/// Parameters of the detail route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteParams {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/products`
    Products,
    /// `/product-details/{id}`
    ProductDetails(RouteParams),
}

impl Route {
    pub fn product_details(id: impl Into<String>) -> Self {
        Route::ProductDetails(RouteParams { id: id.into() })
    }

    /// Match a path against the route table. `None` means no screen.
    ///
    /// Query strings and fragments are ignored, as is a trailing slash.
    /// `/products` matches exactly; `/products/5` does not.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.strip_prefix('/')?;
        let path = path.strip_suffix('/').unwrap_or(path);

        let mut segments = path.split('/');
        let route = match (segments.next(), segments.next()) {
            (Some("products"), None) => Route::Products,
            (Some("product-details"), Some(id)) if !id.is_empty() => {
                let id = urlencoding::decode(id).ok()?;
                Route::product_details(id.into_owned())
            }
            _ => return None,
        };

        if segments.next().is_some() {
            return None;
        }
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Products => write!(f, "/products"),
            Route::ProductDetails(params) => {
                write!(f, "/product-details/{}", urlencoding::encode(&params.id))
            }
        }
    }
}
