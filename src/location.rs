//! Locations are the named places in the village which the robot can visit.
use crate::id::define_id_type;

define_id_type! {LocationID}
