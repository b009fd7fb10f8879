pub mod commodity;
pub mod opportunity;
pub mod params;
pub mod region;
pub mod series;
