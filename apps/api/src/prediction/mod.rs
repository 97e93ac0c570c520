// Half-marathon prediction: feature building, the regression model seam,
// and display formatting of the predicted time.

pub mod features;
pub mod format;
pub mod model;
