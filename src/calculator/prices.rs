// src/calculator/prices.rs
//! Price list and coefficients, in roubles.

pub type Table = &'static [(&'static str, f64)];
pub type Names = &'static [(&'static str, &'static str)];

pub const DEFAULT_PROPERTY: &str = "apartment";
pub const DEFAULT_WALL: &str = "brick";
pub const DEFAULT_COMPLEXITY: &str = "standard";

pub const WALL_COEFFICIENTS: Table = &[
    ("drywall", 0.8),
    ("brick", 1.2),
    ("concrete", 1.5),
    ("wood", 0.9),
    ("block", 1.0),
];

pub const COMPLEXITY_COEFFICIENTS: Table = &[
    ("easy", 0.9),
    ("standard", 1.0),
    ("complex", 1.3),
    ("very_complex", 1.6),
];

pub const SOCKET_PRICES: Table = &[
    ("socket_single", 350.0),
    ("socket_double", 450.0),
    ("socket_power", 600.0),
    ("switch_single", 300.0),
    ("switch_double", 350.0),
    ("dimmer", 500.0),
    ("tv_socket", 400.0),
    ("network_socket", 450.0),
    ("phone_socket", 350.0),
    ("usb_socket", 550.0),
];
pub const SOCKET_FALLBACK_PRICE: f64 = 350.0;
pub const SOCKET_MIN_ORDER: f64 = 2000.0;

pub const LIGHTING_PRICES: Table = &[
    ("chandelier", 1200.0),
    ("spot_light", 800.0),
    ("wall_light", 900.0),
];

pub const CEILING_COEFFICIENTS: Table = &[
    ("regular", 1.0),
    ("drywall", 1.2),
    ("stretch", 1.1),
    ("suspended", 1.3),
];

pub const PANEL_BASE_PRICES: Table = &[
    ("apartment", 5000.0),
    ("house", 8000.0),
    ("floor", 7000.0),
    ("industrial", 15000.0),
];

pub const PANEL_DEVICE_PRICES: Table = &[
    ("circuit_breaker", 350.0),
    ("rcd", 500.0),
    ("diff_auto", 800.0),
    ("meter", 1500.0),
    ("contactor", 900.0),
    ("voltage_relay", 700.0),
    ("timer", 600.0),
    ("phase_monitor", 800.0),
];
pub const PANEL_MIN_ORDER: f64 = 5000.0;

pub const CABLING_PRICES: Table = &[
    ("open", 120.0),
    ("hidden", 180.0),
    ("cable_channel", 150.0),
    ("corrugation", 160.0),
    ("ground", 350.0),
    ("overhead", 250.0),
];

pub const CABLE_SECTION_COEFFICIENTS: Table = &[
    ("1.5", 1.0),
    ("2.5", 1.1),
    ("4.0", 1.25),
    ("6.0", 1.4),
    ("10.0", 1.7),
];

pub const MIN_AREAS: Table = &[
    ("apartment", 20.0),
    ("house", 50.0),
    ("office", 30.0),
    ("commercial", 40.0),
    ("industrial", 100.0),
];

pub const PROPERTY_NAMES: Names = &[
    ("apartment", "Квартира"),
    ("house", "Дом/коттедж"),
    ("office", "Офис"),
    ("commercial", "Коммерческое помещение"),
    ("industrial", "Промышленное помещение"),
];

pub const WALL_NAMES: Names = &[
    ("drywall", "Гипсокартон"),
    ("brick", "Кирпич"),
    ("concrete", "Бетон"),
    ("wood", "Дерево"),
    ("block", "Газоблок/пеноблок"),
];

pub const COMPLEXITY_NAMES: Names = &[
    ("easy", "Простой монтаж"),
    ("standard", "Стандартная сложность"),
    ("complex", "Сложный монтаж"),
    ("very_complex", "Очень сложный монтаж"),
];

pub const DEVICE_NAMES: Names = &[
    ("socket_single", "розетка одинарная"),
    ("socket_double", "розетка двойная"),
    ("socket_power", "розетка силовая"),
    ("switch_single", "выключатель одноклавишный"),
    ("switch_double", "выключатель двухклавишный"),
    ("dimmer", "диммер"),
    ("tv_socket", "ТВ розетка"),
    ("network_socket", "интернет розетка"),
    ("phone_socket", "телефонная розетка"),
    ("usb_socket", "USB розетка"),
    ("chandelier", "люстра / подвесной светильник"),
    ("spot_light", "точечный светильник"),
    ("wall_light", "настенный светильник"),
    ("circuit_breaker", "автомат"),
    ("rcd", "УЗО"),
    ("diff_auto", "дифавтомат"),
    ("meter", "установка счетчика"),
    ("contactor", "контактор"),
    ("voltage_relay", "реле напряжения"),
    ("timer", "таймер"),
    ("phase_monitor", "устройство контроля фаз"),
];

pub const CEILING_NAMES: Names = &[
    ("regular", "Обычный (бетонная плита)"),
    ("drywall", "Гипсокартонный"),
    ("stretch", "Натяжной"),
    ("suspended", "Подвесной"),
];

pub const PANEL_TYPE_NAMES: Names = &[
    ("apartment", "Квартирный щиток"),
    ("house", "Щит для частного дома"),
    ("floor", "Этажный щит"),
    ("industrial", "Промышленный щит"),
];

pub const CABLING_TYPE_NAMES: Names = &[
    ("open", "Открытая проводка"),
    ("hidden", "Скрытая проводка"),
    ("cable_channel", "Проводка в кабель-канале"),
    ("corrugation", "Проводка в гофре"),
    ("ground", "Подземная прокладка"),
    ("overhead", "Воздушная прокладка"),
];

pub fn lookup(table: Table, key: &str) -> Option<f64> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

pub fn lookup_or(table: Table, key: &str, default: f64) -> f64 {
    lookup(table, key).unwrap_or(default)
}

/// Human-readable name for a code, falling back to the code itself.
pub fn display_name<'a>(names: Names, key: &'a str) -> &'a str {
    names
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

/// Wall and complexity coefficients for the given codes; unknown codes fall back to defaults.
pub fn work_coefficients(wall: &str, complexity: &str) -> f64 {
    let wall = lookup(WALL_COEFFICIENTS, wall)
        .or_else(|| lookup(WALL_COEFFICIENTS, DEFAULT_WALL))
        .unwrap_or(1.0);
    let complexity = lookup(COMPLEXITY_COEFFICIENTS, complexity).unwrap_or(1.0);
    wall * complexity
}
