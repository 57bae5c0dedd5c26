//! Names for the numeric venue, car and team ids found in match reports
//!
//! Racing ids are only meaningful together with the game's session code.
//! Anything not listed renders as `UNKNOWN` (`Unknown Team` for hockey).

pub const UNKNOWN: &str = "UNKNOWN";
pub const UNKNOWN_TEAM: &str = "Unknown Team";

pub const MOST_WANTED: &str = "PSP/NFS06";
pub const CARBON: &str = "PSP/NFS07";
pub const PRO_STREET: &str = "PSP/NFS08";
pub const UNDERCOVER: &str = "PSP/NFS09";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Track {
    venue: i64,
    kind: Option<&'static str>,
    name: &'static str,
}

impl Track {
    const fn plain(venue: i64, name: &'static str) -> Self {
        Self { venue, kind: None, name }
    }

    const fn typed(venue: i64, kind: &'static str, name: &'static str) -> Self {
        Self { venue, kind: Some(kind), name }
    }

    /// "SPRINT - HIGH TO LOW", or the bare name for untyped tracks
    fn display(&self) -> String {
        match self.kind {
            Some(kind) => format!("{} - {}", kind, self.name),
            None => self.name.to_string(),
        }
    }
}

fn tracks_of(vers: &str) -> Option<&'static [Track]> {
    match vers {
        MOST_WANTED => Some(MOST_WANTED_TRACKS),
        CARBON => Some(CARBON_TRACKS),
        PRO_STREET => Some(PRO_STREET_TRACKS),
        UNDERCOVER => Some(UNDERCOVER_TRACKS),
        _ => None,
    }
}

fn cars_of(vers: &str) -> Option<&'static [(i64, &'static str)]> {
    match vers {
        MOST_WANTED => Some(MOST_WANTED_CARS),
        CARBON => Some(CARBON_CARS),
        PRO_STREET => Some(PRO_STREET_CARS),
        UNDERCOVER => Some(UNDERCOVER_CARS),
        _ => None,
    }
}

pub fn track_name(vers: &str, venue: Option<i64>) -> String {
    venue
        .and_then(|id| tracks_of(vers)?.iter().find(|t| t.venue == id))
        .map(Track::display)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn car_name(vers: &str, car: Option<i64>) -> &'static str {
    car.and_then(|id| cars_of(vers)?.iter().find(|(c, _)| *c == id))
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}

pub fn team_name(team: i64) -> &'static str {
    NHL_TEAMS
        .iter()
        .find(|(id, _)| *id == team)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_TEAM)
}

/// Forward and reverse layouts have their own venue ids
static MOST_WANTED_TRACKS: &[Track] = &[
    Track::plain(0, "CITY POWER"),
    Track::plain(1, "CITY POWER"),
    Track::plain(2, "GREAT NORTHERN WAY"),
    Track::plain(3, "GREAT NORTHERN WAY"),
    Track::plain(4, "DOWNTOWN EXPRESSWAY"),
    Track::plain(5, "DOWNTOWN EXPRESSWAY"),
    Track::plain(6, "EXCHANGE DISTRICT"),
    Track::plain(7, "EXCHANGE DISTRICT"),
    Track::plain(8, "SOUTH CENTRAL"),
    Track::plain(9, "SOUTH CENTRAL"),
    Track::plain(10, "MAIN & TERMINAL"),
    Track::plain(11, "MAIN & TERMINAL"),
    Track::plain(12, "WEST VILLAGE"),
    Track::plain(13, "WEST VILLAGE"),
    Track::plain(14, "RIVERVIEW"),
    Track::plain(15, "RIVERVIEW"),
    Track::plain(16, "5TH PRECINCT"),
    Track::plain(17, "5TH PRECINCT"),
    Track::plain(18, "HILLSIDE"),
    Track::plain(19, "HILLSIDE"),
];

/// Circuits 1-20, sprints 21-30
static CARBON_TRACKS: &[Track] = &[
    Track::typed(1, "CIRCUIT", "PERIMETER"),
    Track::typed(2, "CIRCUIT", "REACTOR LOOP"),
    Track::typed(3, "CIRCUIT", "JUNKTOWN SCRAMBLE"),
    Track::typed(4, "CIRCUIT", "STORAGE RUN"),
    Track::typed(5, "CIRCUIT", "EAST TUNNEL"),
    Track::typed(6, "CIRCUIT", "INNER CITY RUN"),
    Track::typed(7, "CIRCUIT", "URBAN TECHNICAL"),
    Track::typed(8, "CIRCUIT", "CROSSOVER"),
    Track::typed(9, "CIRCUIT", "FACTORY CIRCUIT"),
    Track::typed(10, "CIRCUIT", "JUNKYARD BLITZ"),
    Track::typed(11, "CIRCUIT", "CENTRIFUGAL"),
    Track::typed(12, "CIRCUIT", "BRIDGE CITY"),
    Track::typed(13, "CIRCUIT", "SCRYSCRAPER CIRCUIT"),
    Track::typed(14, "CIRCUIT", "TWO BRIDGE CIRCUIT"),
    Track::typed(15, "CIRCUIT", "HOMES AND TOWERS"),
    Track::typed(16, "CIRCUIT", "SOUTH SIDE"),
    Track::typed(17, "CIRCUIT", "FIGURE EIGHT"),
    Track::typed(18, "CIRCUIT", "WESTSIDE LOOP"),
    Track::typed(19, "CIRCUIT", "UNIVERSITY DRIVE"),
    Track::typed(20, "CIRCUIT", "GIANT LOOP"),
    Track::typed(21, "SPRINT", "LONG POINT"),
    Track::typed(22, "SPRINT", "MOUNTAIN SPEEDZONE"),
    Track::typed(23, "SPRINT", "WESTSIDE SPRINT"),
    Track::typed(24, "SPRINT", "DOUBLE SWITCH"),
    Track::typed(25, "SPRINT", "CROSS TOWN SPRINT"),
    Track::typed(26, "SPRINT", "SHIPYARD SPRINT"),
    Track::typed(27, "SPRINT", "NORTH BRIDGE SPRINT"),
    Track::typed(28, "SPRINT", "DOWNTOWN SPRINT"),
    Track::typed(29, "SPRINT", "MOUNTAINS TO SHIPYARD"),
    Track::typed(30, "SPRINT", "HIGH TO LOW"),
];

/// Venue, then layout
static PRO_STREET_TRACKS: &[Track] = &[
    Track::typed(1, "INFINEON RACEWAY", "INNER CIRCUIT"),
    Track::typed(2, "INFINEON RACEWAY", "OUTER CIRCUIT"),
    Track::typed(3, "INFINEON RACEWAY", "SHORT CIRCUIT"),
    Track::typed(4, "AUTOBAHN GRIP", "GRIP LARGE"),
    Track::typed(5, "AUTOBAHN GRIP", "GRIP MEDIUM"),
    Track::typed(6, "AUTOBAHN GRIP", "GRIP SMALL"),
    Track::typed(7, "AUTOBAHN", "CIRCUIT"),
    Track::typed(8, "WILLOWSPRINGS RACEWAY", "THE STREETS - SHORT 1"),
    Track::typed(9, "WILLOWSPRINGS RACEWAY", "THE STREETS - SHORT 2"),
    Track::typed(10, "WILLOWSPRINGS RACEWAY", "THE STREETS - SHORT 3"),
    Track::typed(11, "WILLOWSPRINGS RACEWAY", "HORSE THIEF MILE 1"),
    Track::typed(12, "WILLOWSPRINGS RACEWAY", "HORSE THIEF MILE 2"),
    Track::typed(13, "WILLOWSPRINGS RACEWAY", "GRAND PRIX CIRCUIT"),
    Track::typed(14, "AUTOPOLIS", "SHORT CIRCUIT"),
    Track::typed(15, "AUTOPOLIS", "GRAND PRIX CIRCUIT"),
    Track::typed(16, "AIRFIELD", "RACE 1"),
    Track::typed(17, "AIRFIELD", "RACE 2"),
    Track::typed(18, "AIRFIELD", "RACE 3"),
    Track::typed(19, "AIRFIELD", "RACE 4"),
    Track::typed(20, "AIRFIELD", "RACE 5"),
    Track::typed(21, "TOKYO HIGHWAY", "RACE 1"),
    Track::typed(22, "TOKYO HIGHWAY", "RACE 2"),
    Track::typed(23, "MONDELLO PARK", "GP CIRCUIT"),
    Track::typed(24, "MONDELLO PARK", "SHORT CIRCUIT"),
    Track::typed(25, "MONDELLO PARK", "CLUB CIRCUIT"),
    Track::typed(26, "PORSCHE TEST TRACK", "CLUB CIRCUIT"),
    Track::typed(27, "PORSCHE TEST TRACK", "HIGH SPEED TRACK"),
    Track::typed(28, "PORSCHE TEST TRACK", "LONG CIRCUIT"),
    Track::typed(29, "PORTLAND INT. RACEWAY", "PORTLAND CIRCUIT"),
    Track::typed(30, "TEXAS WORLD SPEEDWAY", "OVAL"),
    Track::typed(31, "TEXAS WORLD SPEEDWAY", "CLUB CIRCUIT"),
    Track::typed(32, "TEXAS WORLD SPEEDWAY", "SHORT CIRCUIT 1"),
    Track::typed(33, "TEXAS WORLD SPEEDWAY", "SHORT CIRCUIT 2"),
    Track::typed(34, "TEXAS WORLD SPEEDWAY", "GP CIRCUIT 1"),
    Track::typed(35, "TEXAS WORLD SPEEDWAY", "GP CIRCUIT 2"),
    Track::typed(36, "TEXAS WORLD SPEEDWAY", "GP CIRCUIT 3"),
    Track::typed(37, "BEACH FRONT", "RACE 1"),
    Track::typed(38, "BEACH FRONT", "RACE 2"),
];

/// Circuits 1-22, sprints 23-36, gateways 37-39
static UNDERCOVER_TRACKS: &[Track] = &[
    Track::typed(1, "CIRCUIT", "SWAMP"),
    Track::typed(2, "CIRCUIT", "EDGEWAY"),
    Track::typed(3, "CIRCUIT", "THROUGH TOWN"),
    Track::typed(4, "CIRCUIT", "EASTSIDE"),
    Track::typed(5, "CIRCUIT", "ZIPPER"),
    Track::typed(6, "CIRCUIT", "DOWNTOWN LOOP"),
    Track::typed(7, "CIRCUIT", "CLASSIC"),
    Track::typed(8, "CIRCUIT", "WINDMILL"),
    Track::typed(9, "CIRCUIT", "BOARDWALK"),
    Track::typed(10, "CIRCUIT", "MIDTOWN"),
    Track::typed(11, "CIRCUIT", "INDUSTRIAL"),
    Track::typed(12, "CIRCUIT", "GIANT LOOP"),
    Track::typed(13, "CIRCUIT", "NORTH LOOP"),
    Track::typed(14, "CIRCUIT", "SOUTH LOOP"),
    Track::typed(15, "CIRCUIT", "COAST"),
    Track::typed(16, "CIRCUIT", "FIGURE EIGHT"),
    Track::typed(17, "CIRCUIT", "INTERIOR"),
    Track::typed(18, "CIRCUIT", "HEAT"),
    Track::typed(19, "CIRCUIT", "HIGHRISE"),
    Track::typed(20, "CIRCUIT", "HYBRID"),
    Track::typed(21, "CIRCUIT", "GEAR HEAD"),
    Track::typed(22, "CIRCUIT", "TUNNEL"),
    Track::typed(23, "SPRINT", "PERIMETER"),
    Track::typed(24, "SPRINT", "SWITCHBACK"),
    Track::typed(25, "SPRINT", "HORSESHOE"),
    Track::typed(26, "SPRINT", "SNAKE"),
    Track::typed(27, "SPRINT", "CRESCENT"),
    Track::typed(28, "SPRINT", "RESIDENTIAL"),
    Track::typed(29, "SPRINT", "MILITARY"),
    Track::typed(30, "SPRINT", "TWISTER"),
    Track::typed(31, "SPRINT", "FAST TRACK"),
    Track::typed(32, "SPRINT", "SHIPYARD"),
    Track::typed(33, "SPRINT", "SPIRAL"),
    Track::typed(34, "SPRINT", "NOOSE"),
    Track::typed(35, "SPRINT", "OUTSIDE"),
    Track::typed(36, "SPRINT", "DIPPER"),
    Track::typed(37, "GATEWAY", "SUNSET KILLS"),
    Track::typed(38, "GATEWAY", "PORT CRESCENT"),
    Track::typed(39, "GATEWAY", "PALM HARBOR"),
];

/// Most Wanted 5-1-0
static MOST_WANTED_CARS: &[(i64, &str)] = &[
    (0, "CARRERA 4S"),
    (1, "CARRERA GT"),
    (2, "COBALT SS"),
    (3, "CORVETTE"),
    (4, "ECLIPSE"),
    (5, "FORD GT"),
    (6, "GALLARDO"),
    (7, "GOLF"),
    (8, "LANCER"),
    (9, "M3 GTR 1"),
    (10, "M3 GTR 2"),
    (11, "MAZDA3"),
    (12, "MUSTANG GT"),
    (13, "RX-8"),
    (14, "TT"),
    (15, "WRX STI"),
];

/// Carbon - Own the City
static CARBON_CARS: &[(i64, &str)] = &[
    (14, "ECLIPSE GT"),
    (15, "LANCER"),
    (16, "GOLF GTI"),
    (17, "CORVETTE"),
    (18, "COBALT SS"),
    (19, "CARRERA GT"),
    (20, "GALLARDO"),
    (21, "FORD GT"),
    (22, "MUSTANG GT"),
    (23, "WRX STI"),
    (24, "TT 3.2"),
    (25, "RX-8"),
    (26, "911 CARRERA S"),
    (27, "MAZDASPEED 3"),
    (28, "SUPRA"),
    (29, "SOLSTICE"),
    (30, "RX-7"),
    (31, "SKYLINE"),
    (32, "240 SX"),
    (33, "MR2"),
    (34, "350Z"),
    (35, "GTO"),
    (36, "1967 MUSTANG"),
    (37, "300C SRT8"),
    (38, "MURCIÉLAGO"),
    (39, "DB9"),
    (40, "ELISE"),
    (41, "SL65 AMG"),
    (42, "FIREBIRD"),
];

/// ProStreet, race-spec variants included
static PRO_STREET_CARS: &[(i64, &str)] = &[
    (14, "EVOLUTION IX"),
    (15, "GOLF GTI"),
    (16, "CORVETTE Z06"),
    (17, "COBALT SS"),
    (18, "FORD GT"),
    (19, "GT 500"),
    (20, "IMPREZA WRX STI"),
    (21, "RX-8"),
    (22, "MAZDASPEED3"),
    (23, "SUPRA"),
    (24, "SOLSTICE GXP"),
    (25, "RX-7"),
    (26, "SKYLINE GT-R (R34)"),
    (27, "350Z (Z33)"),
    (28, "GT500 (Eleanor)"),
    (29, "MURCIÉLAGO LP640"),
    (30, "ELISE"),
    (31, "RS4"),
    (32, "LANCER EVOLUTION"),
    (33, "COROLLA GTS (AE86)"),
    (34, "GOLF R32"),
    (35, "CIVIC SI"),
    (36, "SILVIA (S15)"),
    (37, "INTEGRA TYPE R"),
    (38, "CAMARO CONCEPT"),
    (39, "CHARGER R/T"),
    (40, "CHALLENGER"),
    (41, "NSX"),
    (42, "M3 E92"),
    (43, "GT-R (R35)"),
    (44, "CAYMAN S"),
    (45, "911 TURBO"),
    (46, "ZONDA F"),
    (47, "911 GT2"),
    (48, "SKYLINE GT-R (R34) (RACE)"),
    (49, "GT-R PROTO (RACE)"),
    (50, "EVOLUTION (RACE)"),
    (51, "M3 E92 (RACE)"),
    (52, "IMPREZA WRX STI (RACE)"),
    (53, "RX-8 (RACE)"),
    (54, "CIVIC SI (RACE)"),
    (55, "SILVIA (S15) (RACE)"),
    (56, "COROLLA GTS (AE86) (RACE)"),
    (57, "CAYMAN S (RACE)"),
    (58, "FORD GT (RACE)"),
    (59, "MURCIÉLAGO LP640 (RACE)"),
    (60, "ZONDA F (RACE)"),
    (61, "911 GT2 (RACE)"),
    (62, "CAMARO CONCEPT (RACE)"),
    (63, "GT 500 (RACE)"),
];

/// Undercover
static UNDERCOVER_CARS: &[(i64, &str)] = &[
    (11, "LANCER EVO IX"),
    (12, "GOLF GTI"),
    (13, "CORVETTE"),
    (14, "CARRERA GT"),
    (15, "GALLARDO"),
    (16, "FORD GT"),
    (17, "MUSTANG GT"),
    (18, "RX-8"),
    (19, "MAZDA3 MPS"),
    (20, "SUPRA"),
    (21, "SOLSTICE GXP"),
    (22, "RX-7"),
    (23, "SKYLINE"),
    (24, "240SX (S13)"),
    (25, "350Z (Z33)"),
    (26, "67 MUSTANG"),
    (27, "300C SRT8"),
    (28, "DB9"),
    (29, "ELISE"),
    (30, "SL65 AMG"),
    (31, "FIREBIRD"),
    (32, "ZONDA F"),
    (33, "GT2"),
    (34, "LANCER"),
    (35, "MUSTANG"),
    (36, "R8"),
    (37, "CAYMAN"),
    (38, "GT2"),
    (39, "CHARGER"),
    (40, "M3 E92"),
    (41, "GALLARDO"),
    (42, "GTR"),
    (43, "LANCER EVO X"),
    (44, "VIPER"),
    (45, "SRT8"),
    (46, "911 GT2"),
    (47, "370Z (Z34)"),
];

/// NHL 07 team ids; leagues and national sides follow the NHL clubs
static NHL_TEAMS: &[(i64, &str)] = &[
    (0, "Anaheim Ducks"),
    (1, "Atlanta Thrashers"),
    (2, "Boston Bruins"),
    (3, "Buffalo Sabres"),
    (4, "Calgary Flames"),
    (5, "Carolina Hurricanes"),
    (6, "Chicago Blackhawks"),
    (7, "Colorado Avalanche"),
    (8, "Columbus Blue Jackets"),
    (9, "Dallas Stars"),
    (10, "Detroit Red Wings"),
    (11, "Edmonton Oilers"),
    (12, "Florida Panthers"),
    (13, "Los Angeles Kings"),
    (14, "Minnesota Wild"),
    (15, "Montreal Canadiens"),
    (16, "Nashville Predators"),
    (17, "New Jersey Devils"),
    (18, "New York Islanders"),
    (19, "New York Rangers"),
    (20, "Ottawa Senators"),
    (21, "Philadelphia Flyers"),
    (22, "Arizona Coyotes"),
    (23, "Pittsburgh Penguins"),
    (24, "St. Louis Blues"),
    (25, "San Jose Sharks"),
    (26, "Tampa Bay Lightning"),
    (27, "Toronto Maple Leafs"),
    (28, "Vancouver Canucks"),
    (29, "Washington Capitals"),
    (30, "Eastern All-Stars"),
    (31, "Western All-Stars"),
    (32, "North America All-Stars"),
    (33, "World All-Stars"),
    (34, "Austria"),
    (35, "Belarus"),
    (36, "Canada"),
    (37, "Czech Republic"),
    (38, "Denmark"),
    (39, "Finland"),
    (40, "France"),
    (41, "Germany"),
    (42, "Great Britain"),
    (43, "Italy"),
    (44, "Winnipeg Jets"),
    (45, "Kazakhstan"),
    (46, "Latvia"),
    (47, "Vegas Golden Knights"),
    (48, "Hungary"),
    (49, "Russia"),
    (50, "Slovakia"),
    (51, "Sweden"),
    (52, "Switzerland"),
    (53, "Norway"),
    (54, "USA"),
    (55, "Brynäs IF"),
    (56, "Djurgårdens IF"),
    (57, "Färjestads BK"),
    (58, "Frölunda Indians"),
    (59, "HV 71"),
    (60, "Mora IK"),
    (61, "Linköpings HC"),
    (62, "Luleå HF"),
    (63, "Leksands IF"),
    (64, "MODO Hockey"),
    (65, "Södertälje SK"),
    (66, "Timrå IK"),
    (67, "Porin Ässät"),
    (68, "Espoo Blues"),
    (69, "Helsingin IFK"),
    (70, "HPK Hämeenlinna"),
    (71, "Tampereen Ilves"),
    (72, "Jokerit"),
    (73, "JYP Jyväskylä"),
    (74, "Oulun Kärpät"),
    (75, "Rauman Lukko"),
    (76, "Pelicans Lahti"),
    (77, "SaiPa Lappeenranta"),
    (78, "Tampereen Tappara"),
    (79, "TPS Turku"),
    (80, "KalPa Hockey Oy"),
    (81, "Augsburger Panther"),
    (82, "Eisbären Berlin"),
    (83, "DEG Metro Stars"),
    (84, "Frankfurt Lions"),
    (85, "EV Duisburg die Füsche"),
    (86, "Hamburg Freezers"),
    (87, "Hannover Scorpions"),
    (88, "ERC Ingolstadt"),
    (89, "Iserlohn Roosters"),
    (90, "Kassel Huskies"),
    (91, "Kölner Haie"),
    (92, "Krefeld Pinguine"),
    (93, "Adler Mannheim"),
    (94, "Nürnberg Ice Tigers"),
    (95, "HC Ceske Budejovice"),
    (96, "HC Rabat Kladno"),
    (97, "HC Energie Karlovy Vary"),
    (98, "HC Bili Tygri Liberec"),
    (99, "HC Chemopetrol Litvinov"),
    (100, "HC Moeller Pardubice"),
    (101, "HC Lasselsberger Plzen"),
    (102, "HC Slavia Praha"),
    (103, "HC Sparta Praha"),
    (104, "HC Ocelari Trinec"),
    (105, "HC Vitkovice Steel"),
    (106, "Vsetinska hokejova"),
    (107, "HC Hame Zlin"),
    (108, "HC Znojemsti Orli"),
    (109, "NHL All-Stars"),
    (110, "Seattle Kraken"),
    (111, "Utah Hockey Club"),
];
