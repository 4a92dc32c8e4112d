/// COCO class ids counted as vehicles by default: car, motorcycle, bus, truck.
pub const VEHICLE_CLASSES: [u32; 4] = [2, 3, 5, 7];

/// Display name for a COCO vehicle class id.
pub fn class_name(class_id: u32) -> Option<&'static str> {
    match class_id {
        2 => Some("Car"),
        3 => Some("Motorcycle"),
        5 => Some("Bus"),
        7 => Some("Truck"),
        _ => None,
    }
}
