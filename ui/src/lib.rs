//! Shared UI crate for Marketlens: session orchestration, report rendering
//! and the views both platform shells route to.

pub mod backend;
pub mod core;
pub mod i18n;
pub mod results;
pub mod session;
pub mod views;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;
}

#[cfg(test)]
mod testing;
