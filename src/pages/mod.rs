//! Page components for the careers flow.
//!
//! Each page holds a borrowed [`Toolkit`](crate::toolkit::Toolkit) and its
//! own locator constants; none of them own the session.

pub mod careers;
pub mod home;

pub use careers::CareersPage;
pub use home::HomePage;

#[cfg(test)]
#[path = "../pages_test.rs"]
mod pages_test;
