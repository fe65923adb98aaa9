//! Room template catalog
//!
//! A fixed, ordered table mapping each room type to its display metadata and
//! the default checklist seeded when a room of that type is created. Item
//! order is display order.

use crate::models::RoomType;

/// Display metadata and default checklist for a room type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomTemplate {
    pub room_type: RoomType,
    pub name: &'static str,
    pub icon: &'static str,
    pub default_items: &'static [&'static str],
}

/// Every template, in catalog order
pub static ROOM_TEMPLATES: [RoomTemplate; 12] = [
    RoomTemplate {
        room_type: RoomType::Bedroom,
        name: "Bedroom",
        icon: "🛏️",
        default_items: &[
            "Walls and paint condition",
            "Window and window sill",
            "Flooring condition",
            "Ceiling condition",
            "Light fixtures and switches",
            "Electrical outlets",
            "Closet interior",
            "Door and door frame",
            "Baseboards and trim",
            "Any nail holes or marks",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Bathroom,
        name: "Bathroom",
        icon: "🚿",
        default_items: &[
            "Toilet condition and functionality",
            "Sink and faucet condition",
            "Bathtub/shower condition",
            "Tile and grout condition",
            "Mirror condition",
            "Light fixtures",
            "Exhaust fan functionality",
            "Flooring condition",
            "Walls and paint condition",
            "Towel bars and hooks",
            "Medicine cabinet",
            "Plumbing fixtures",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Kitchen,
        name: "Kitchen",
        icon: "🍳",
        default_items: &[
            "Refrigerator interior and exterior",
            "Oven and stovetop condition",
            "Dishwasher interior and exterior",
            "Garbage disposal functionality",
            "Kitchen sink and faucet",
            "Countertops condition",
            "Cabinet doors and drawers",
            "Cabinet interior cleanliness",
            "Backsplash condition",
            "Flooring condition",
            "Light fixtures",
            "Electrical outlets",
            "Walls and paint condition",
        ],
    },
    RoomTemplate {
        room_type: RoomType::LivingRoom,
        name: "Living Room",
        icon: "🛋️",
        default_items: &[
            "Walls and paint condition",
            "Windows and window sills",
            "Flooring condition",
            "Ceiling condition",
            "Light fixtures and switches",
            "Electrical outlets",
            "Fireplace condition (if applicable)",
            "Built-in shelving or cabinets",
            "Door and door frame",
            "Baseboards and trim",
            "Any furniture marks or damage",
        ],
    },
    RoomTemplate {
        room_type: RoomType::DiningRoom,
        name: "Dining Room",
        icon: "🍽️",
        default_items: &[
            "Walls and paint condition",
            "Windows and window sills",
            "Flooring condition",
            "Ceiling condition",
            "Light fixtures (including chandelier)",
            "Electrical outlets",
            "Built-in china cabinet (if applicable)",
            "Door and door frame",
            "Baseboards and trim",
            "Any scuff marks or damage",
        ],
    },
    RoomTemplate {
        room_type: RoomType::LaundryRoom,
        name: "Laundry Room",
        icon: "👕",
        default_items: &[
            "Washer and dryer connections",
            "Utility sink condition",
            "Flooring condition",
            "Walls and paint condition",
            "Ventilation system",
            "Electrical outlets",
            "Light fixtures",
            "Storage shelves or cabinets",
            "Door and door frame",
            "Water shut-off valves",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Basement,
        name: "Basement",
        icon: "🏠",
        default_items: &[
            "Foundation walls condition",
            "Flooring condition",
            "Ceiling condition",
            "Light fixtures",
            "Electrical panel and outlets",
            "Plumbing exposed pipes",
            "HVAC system components",
            "Sump pump (if applicable)",
            "Storage areas",
            "Stairs and railings",
            "Any signs of moisture or mold",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Garage,
        name: "Garage",
        icon: "🚗",
        default_items: &[
            "Garage door functionality",
            "Garage door opener",
            "Flooring condition",
            "Wall condition",
            "Electrical outlets",
            "Light fixtures",
            "Storage systems",
            "Workbench or built-ins",
            "Windows condition",
            "Any oil stains or damage",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Hallway,
        name: "Hallway",
        icon: "🚪",
        default_items: &[
            "Walls and paint condition",
            "Flooring condition",
            "Ceiling condition",
            "Light fixtures and switches",
            "Electrical outlets",
            "Linen closet interior",
            "Baseboards and trim",
            "Any scuff marks or damage",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Closet,
        name: "Closet",
        icon: "👔",
        default_items: &[
            "Interior walls condition",
            "Flooring condition",
            "Ceiling condition",
            "Light fixture",
            "Closet rod condition",
            "Shelving condition",
            "Door and door frame",
            "Any hooks or organizers",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Balcony,
        name: "Balcony/Patio",
        icon: "🌿",
        default_items: &[
            "Flooring/decking condition",
            "Railing condition and safety",
            "Door leading to balcony",
            "Light fixtures",
            "Electrical outlets (if any)",
            "Drainage condition",
            "Any furniture marks or stains",
            "Screen door (if applicable)",
        ],
    },
    RoomTemplate {
        room_type: RoomType::Other,
        name: "Other Room",
        icon: "📦",
        default_items: &[
            "Walls and paint condition",
            "Flooring condition",
            "Ceiling condition",
            "Light fixtures",
            "Electrical outlets",
            "Door and door frame",
            "Windows (if any)",
            "Any specific features",
        ],
    },
];

/// Look up the template for a room type
pub fn template_for(room_type: RoomType) -> Option<&'static RoomTemplate> {
    ROOM_TEMPLATES.iter().find(|t| t.room_type == room_type)
}

/// All room types, in catalog order
pub fn all_room_types() -> impl Iterator<Item = RoomType> {
    ROOM_TEMPLATES.iter().map(|t| t.room_type)
}
