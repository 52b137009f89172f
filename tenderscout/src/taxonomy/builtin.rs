//! Built-in pattern lists for drone and energy-infrastructure work.

/// Drone, remote sensing and aerial-imaging terms.
pub const PRIMARY: &[&str] = &[
    r"\bdrones?\b",
    r"\buas\b",
    r"\buavs?\b",
    r"\brpas\b",
    r"\bremotely[- ]?piloted\b",
    r"\blidar\b",
    r"\bthermograph(?:y|ic)\b",
    r"\binfrared\b",
    r"\bir\b",
    r"\baerial\s+(?:survey|inspection|mapping|photography)\b",
    r"\bphotogrammetr(?:y|ic)\b",
];

/// Energy-infrastructure context.
pub const BOOSTER: &[&str] = &[
    r"\bsolar\b",
    r"\bpv\b",
    r"\bphotovoltaic\b",
    r"\bwind\b",
    r"\bturbines?\b",
    r"\brenewables?\b",
    r"\benergy\b",
    r"\bsubstation\b",
    r"\btransmission\b",
    r"\bdistribution\b",
    r"\bbattery(?:\s+storage)?\b",
    r"\bbess\b",
    r"\bo&m\b",
    r"\boperations?\s+and\s+maintenance\b",
    r"\bfarm\b",
];

/// Inspection, survey and maintenance-class work.
pub const GENERIC_WORK: &[&str] = &[
    r"\binspect(?:ion|ions)?\b",
    r"\bsurvey(?:s|ing)?\b",
    r"\bmapping\b",
    r"\bmaintenance\b",
    r"\bcondition\s+assessment\b",
    r"\bvegetation\b",
];

/// Administrative and advisory work that is almost never aerial.
pub const DISQUALIFIER: &[&str] = &[
    r"\bconnecting with country\b",
    r"\bdesign review panel\b",
    r"\bacoustic advisory\b",
    r"\bstrategy\b",
    r"\bheritage\b",
    r"\bcommunity (?:consultation|engagement)\b",
    r"\bbrand(?:ing)?\b",
    r"\bict strategy\b",
    r"\bpolicy\b",
];
