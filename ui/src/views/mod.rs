mod home;
pub use home::Home;

mod results;
pub use results::Results;
