//! Known schema renames between game data versions
//!
//! Several columns and rows changed names across releases. Without this table
//! they would show up as one removal plus one addition. The rule set is closed:
//! every entry records a specific historical edit, nothing here is fuzzy.

/// monstats.txt treasure-class reshuffle (old, new), per difficulty suffix
const MONSTATS_RENAMES: &[(&str, &str)] = &[
    ("ShieldBlockOverride", "NoShldBlock"),
    ("TreasureClass", "TreasureClass1"),
    ("TreasureClassChamp", "TreasureClass2"),
    ("TreasureClassUnique", "TreasureClass3"),
    ("TreasureClassQuest", "TreasureClass4"),
    ("TreasureClass(N)", "TreasureClass1(N)"),
    ("TreasureClassChamp(N)", "TreasureClass2(N)"),
    ("TreasureClassUnique(N)", "TreasureClass3(N)"),
    ("TreasureClassQuest(N)", "TreasureClass4(N)"),
    ("TreasureClass(H)", "TreasureClass1(H)"),
    ("TreasureClassChamp(H)", "TreasureClass2(H)"),
    ("TreasureClassUnique(H)", "TreasureClass3(H)"),
    ("TreasureClassQuest(H)", "TreasureClass4(H)"),
];

/// itemstatcost.txt stats that took over previously unused slots
const ITEM_STAT_COST_ADDED: &[&str] = &[
    "lasthitreactframe",
    "create_season",
    "bonus_mindamage",
    "bonus_maxdamage",
    "item_pierce_cold_immunity",
    "item_pierce_fire_immunity",
    "item_pierce_light_immunity",
    "item_pierce_poison_immunity",
    "item_pierce_damage_immunity",
    "item_pierce_magic_immunity",
    "item_charge_noconsume",
    "modifierlist_castid",
    "item_noconsume",
    "passive_mastery_noconsume",
    "passive_mastery_replenish_oncrit",
    "passive_mastery_gethit_rate",
    "passive_mastery_attack_speed",
];

const ITEM_STAT_COST_REMOVED: &[&str] = &[
    "unused183",
    "unused184",
    "unused185",
    "unused186",
    "unused187",
    "unused189",
    "unused190",
    "unused191",
    "unused192",
    "unused193",
    "unused200",
    "unused202",
    "unused204",
    "unused205",
    "unused206",
    "unused207",
    "unused212",
];

/// (added contains, removed contains) pairs, checked case-insensitively
const SUBSTRING_RENAMES: &[(&str, &str)] = &[
    // NPC name fixes
    ("hratli", "hralti"),
    ("anya", "drehya"),
    // cubemain
    ("firstLadderSeason", "ladder"),
    // difficultylevels
    ("MercenaryDamagePercentVSBoss", "HireableBossDamagePercent"),
    // itemtypes
    ("MaxSockets1", "MaxSock1"),
    ("MaxSockets2", "MaxSock25"),
    ("MaxSockets3", "MaxSock40"),
    ("Any", "None"),
    // levels
    ("MonLvl", "MonLvl1"),
    ("MonLvl(N)", "MonLvl2"),
    ("MonLvl(H)", "MonLvl3"),
    ("MonLvlEx", "MonLvl1Ex"),
    ("MonLvlEx(N)", "MonLvl2Ex"),
    ("MonLvlEx(H)", "MonLvl3Ex"),
    // objects
    ("*Description", "description - not loaded"),
    // runes
    ("*RunesUsed", "*runes"),
    ("firstLadderSeason", "server"),
    // setitems
    ("*ItemName", "*item"),
    // shrines
    ("Name", "Shrine Type"),
    ("*Shrine Type", "Shrine name"),
    ("*Effect", "Effect"),
    // treasureclassex
    ("*ItemProbSum", "SumItems"),
    ("*ItemProbTotal", "TotalProb"),
    ("*TreasureClassDropChance", "DropChance"),
    ("*eol", "Term"),
    // uniqueitems
    ("*ItemName", "*type"),
    // weapons
    ("*comment", "special"),
];

/// missiles.txt "nehlithak" -> "nihlathak" spelling fix
const NIHLATHAK_SUFFIXES: &[&str] = &[
    "control", "swoosh", "debris1", "debris2", "debris3", "debris4", "glow", "hole",
    "holelight", "glow2", "bonechips",
];

/// Decide whether `added` and `removed` are the same column or row renamed
///
/// `file` names the table being compared; it only labels log output.
pub fn is_known_rename(added: &str, removed: &str, file: &str) -> bool {
    let matched = same_ignoring_comment(added, removed)
        || matches_substring_rule(added, removed)
        || matches_item_stat_cost(added, removed)
        || matches_monstats(added, removed);

    if matched {
        log::trace!("{}: '{}' is a known rename of '{}'", file, added, removed);
    }
    matched
}

/// Case-insensitive equality after dropping one leading `*` from each name
fn same_ignoring_comment(a: &str, b: &str) -> bool {
    let strip = |name: &str| name.strip_prefix('*').unwrap_or(name).to_lowercase();
    strip(a) == strip(b)
}

fn matches_substring_rule(added: &str, removed: &str) -> bool {
    if SUBSTRING_RENAMES
        .iter()
        .any(|(a, r)| contains_ci(added, a) && contains_ci(removed, r))
    {
        return true;
    }

    NIHLATHAK_SUFFIXES.iter().any(|suffix| {
        contains_ci(added, &format!("nihlathak{suffix}"))
            && contains_ci(removed, &format!("nehlithak{suffix}"))
    })
}

fn matches_item_stat_cost(a: &str, b: &str) -> bool {
    let in_list = |list: &[&str], name: &str| list.iter().any(|s| s.eq_ignore_ascii_case(name));

    (in_list(ITEM_STAT_COST_ADDED, a) && in_list(ITEM_STAT_COST_REMOVED, b))
        || (in_list(ITEM_STAT_COST_ADDED, b) && in_list(ITEM_STAT_COST_REMOVED, a))
}

fn matches_monstats(a: &str, b: &str) -> bool {
    MONSTATS_RENAMES.iter().any(|(old, new)| {
        (a.eq_ignore_ascii_case(old) && b.eq_ignore_ascii_case(new))
            || (a.eq_ignore_ascii_case(new) && b.eq_ignore_ascii_case(old))
    })
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
