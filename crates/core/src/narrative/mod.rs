pub mod contacts;
pub mod opportunities;

pub use contacts::generate_contacts;
pub use opportunities::{generate_market_opportunities, plan_opportunities, render_opportunity};
