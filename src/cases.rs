//! Case profiles and the built-in training catalog
//!
//! A [`CaseProfile`] describes the simulated client. Profiles arrive from the
//! browser with any field possibly missing, so every field is optional and
//! prompt builders substitute `Not provided`.

use serde::{Deserialize, Deserializer, Serialize};

/// Descriptive record of the simulated client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseProfile {
    /// Case theme
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text risk hint, e.g. "High risk (may require urgent referral)"
    #[serde(default)]
    pub risk_level: Option<String>,
    /// Background narrative
    #[serde(default)]
    pub background: Option<String>,
    /// Training goals, in order
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub goals: Vec<String>,
    /// Red flags, in order
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub red_flags: Vec<String>,
}

/// Reads a list of strings, treating `null` or a non-array as empty and
/// skipping non-string items
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

impl CaseProfile {
    /// Case title, or `Not provided`
    pub fn title_or_default(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or("Not provided")
    }

    /// Risk hint, or `Not provided`
    pub fn risk_or_default(&self) -> &str {
        non_blank(self.risk_level.as_deref()).unwrap_or("Not provided")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Coarse risk tag used by the scenario picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTag {
    /// Low or low-medium risk
    Low,
    /// Medium risk
    Medium,
    /// High or medium-high risk
    High,
}

impl RiskTag {
    /// Lowercase tag as shown in listings
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTag::Low => "low",
            RiskTag::Medium => "medium",
            RiskTag::High => "high",
        }
    }
}

/// One practice scenario
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseTemplate {
    /// Stable identifier
    pub id: &'static str,
    /// Picker title
    pub title: &'static str,
    /// Coarse risk tag
    pub risk_tag: RiskTag,
    /// What the scenario practices
    pub description: &'static str,
    /// Trainee-facing brief
    pub brief: &'static str,
    /// The client's first line
    pub opening: &'static str,
    /// Profile passed to every pipeline
    pub profile: TemplateProfile,
}

/// Static form of [`CaseProfile`] stored in the catalog
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateProfile {
    pub title: &'static str,
    pub risk_level: &'static str,
    pub background: &'static str,
    pub goals: &'static [&'static str],
    pub red_flags: &'static [&'static str],
}

impl TemplateProfile {
    /// Owned profile suitable for requests
    pub fn to_profile(&self) -> CaseProfile {
        CaseProfile {
            title: Some(self.title.to_string()),
            risk_level: Some(self.risk_level.to_string()),
            background: Some(self.background.to_string()),
            goals: self.goals.iter().map(|g| g.to_string()).collect(),
            red_flags: self.red_flags.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Looks up a template by id
///
/// # Examples
///
/// ```
/// use crisis_coach::cases::find_case;
///
/// assert!(find_case("postpartum_overwhelm").is_some());
/// assert!(find_case("nope").is_none());
/// ```
pub fn find_case(id: &str) -> Option<&'static CaseTemplate> {
    CASES.iter().find(|case| case.id == id)
}

/// Picks a template at random
pub fn random_case() -> &'static CaseTemplate {
    use rand::seq::IndexedRandom;
    CASES.choose(&mut rand::rng()).unwrap_or(&CASES[0])
}

/// The built-in scenario catalog
pub static CASES: &[CaseTemplate] = &[
    CaseTemplate {
        id: "college_passive_ideation",
        title: "Academic overload (low-medium risk)",
        risk_tag: RiskTag::Low,
        description: "Practice alliance-building, emotion labeling, and stressor mapping.",
        brief: "Client has prolonged academic and relationship pressure. Goal: practice empathic reflection and collaborative exploration.",
        opening: "My mind has been racing lately. I can't sleep well, and the more I think, the more I feel like a failure.",
        profile: TemplateProfile {
            title: "Graduate student with hopelessness and withdrawal",
            risk_level: "Medium risk (requires ongoing assessment)",
            background: "22-year-old graduate student with stacked academic and relationship stress, poor sleep, reduced appetite, and social withdrawal.",
            goals: &[
                "Build therapeutic alliance",
                "Assess passive vs active suicidal ideation",
                "Identify protective factors and support system",
            ],
            red_flags: &["Hopelessness", "Worsening night insomnia", "Avoidance of help-seeking"],
        },
    },
    CaseTemplate {
        id: "workplace_recent_plan",
        title: "Relationship rupture + passive SI (medium risk)",
        risk_tag: RiskTag::Medium,
        description: "Practice supportive direct inquiry and basic safety planning.",
        brief: "Client presents significant hopelessness after relationship rupture. Goal: practice warm but direct risk-assessment questions.",
        opening: "Lately everything feels meaningless. Last night I even thought maybe I should stop trying at all.",
        profile: TemplateProfile {
            title: "Working adult with escalating crisis language",
            risk_level: "High risk (may require urgent referral)",
            background: "29-year-old with one week of severe insomnia, recent layoff and debt stress, and reduced contact with family.",
            goals: &[
                "Clarify current risk level",
                "Ask about plan/means/timeline",
                "Build immediate safety actions and referral path",
            ],
            red_flags: &["Plan-like language", "Weak support network", "Marked functional decline"],
        },
    },
    CaseTemplate {
        id: "adolescent_self_harm_history",
        title: "Relapse risk with prior self-harm history (high risk)",
        risk_tag: RiskTag::High,
        description: "Practice escalation judgment and supervisor-referral awareness.",
        brief: "Client has prior self-harm history and rising family conflict. Goal: move quickly into structured safety assessment.",
        opening: "I don't want to say much. Talking doesn't help anyway. I've started wanting to hurt myself again.",
        profile: TemplateProfile {
            title: "Adolescent with prior self-harm and relapse risk",
            risk_level: "Medium-high risk (family/supervisor coordination needed)",
            background: "17-year-old high school student with prior self-harm. Family conflict increased recently, school attendance is dropping.",
            goals: &[
                "Build emotional safety and alliance",
                "Assess triggers and immediate danger",
                "Include guardian and multi-party coordination",
            ],
            red_flags: &["High concealment", "Impulsivity risk", "Limited peer support"],
        },
    },
    CaseTemplate {
        id: "burnout_healthcare_worker",
        title: "Burnout and emotional numbness (medium risk)",
        risk_tag: RiskTag::Medium,
        description: "Practice validating fatigue while screening for self-harm risk.",
        brief: "Client is emotionally exhausted and detached. Goal: combine validation, gentle structure, and direct risk checks.",
        opening: "I feel empty all the time now. I used to care about people, but now I just feel done with everything.",
        profile: TemplateProfile {
            title: "Healthcare worker with burnout and hopelessness",
            risk_level: "Medium risk (monitor for escalation)",
            background: "31-year-old nurse with repeated overtime and poor sleep, reporting emotional numbness and social withdrawal.",
            goals: &[
                "Validate burnout without normalizing risk",
                "Check passive/active self-harm thoughts",
                "Identify immediate supports for tonight",
            ],
            red_flags: &["Severe fatigue", "Meaninglessness", "Reduced connection to others"],
        },
    },
    CaseTemplate {
        id: "military_transition_isolation",
        title: "Transition stress and isolation (medium risk)",
        risk_tag: RiskTag::Medium,
        description: "Practice identity-loss conversations and support mapping.",
        brief: "Client recently left structured service life and feels disconnected. Goal: assess risk and restore short-term anchors.",
        opening: "Since leaving service, I don't know who I am anymore. Nights are the worst, and my head gets dark.",
        profile: TemplateProfile {
            title: "Recent transition with identity disruption",
            risk_level: "Medium risk (requires close follow-up)",
            background: "35-year-old recently transitioned from military context, now unemployed and socially isolated.",
            goals: &[
                "Explore identity loss and loneliness",
                "Assess current suicidal thoughts and intensity",
                "Co-create immediate coping and contact plan",
            ],
            red_flags: &["Nighttime worsening", "Isolation", "Loss of purpose"],
        },
    },
    CaseTemplate {
        id: "postpartum_overwhelm",
        title: "Postpartum overwhelm and shame (medium-high risk)",
        risk_tag: RiskTag::High,
        description: "Practice compassionate inquiry under intense self-criticism.",
        brief: "Client reports severe overwhelm and shame in parenting role. Goal: maintain safety focus while reducing shame.",
        opening: "I keep thinking my baby deserves a better mom. Sometimes I scare myself with how dark my thoughts get.",
        profile: TemplateProfile {
            title: "Postpartum distress with intrusive dark thoughts",
            risk_level: "Medium-high risk (urgent assessment if active intent appears)",
            background: "26-year-old new parent with sleep deprivation, crying spells, and fear of being judged.",
            goals: &[
                "Reduce shame and increase disclosure",
                "Assess intent/plan/timing clearly",
                "Engage support network quickly",
            ],
            red_flags: &["Self-worth collapse", "Sleep deprivation", "Fear-based concealment"],
        },
    },
    CaseTemplate {
        id: "bereavement_complicated_grief",
        title: "Complicated grief after sudden loss (medium risk)",
        risk_tag: RiskTag::Medium,
        description: "Practice grief-sensitive risk assessment.",
        brief: "Client lost a close family member suddenly and now expresses hopelessness. Goal: hold grief and assess danger directly.",
        opening: "After my brother died, life feels pointless. I keep replaying everything and I can't see a future.",
        profile: TemplateProfile {
            title: "Acute grief with hopelessness and rumination",
            risk_level: "Medium risk (dynamic; reassess each turn)",
            background: "40-year-old with recent bereavement, guilt rumination, reduced appetite, and limited sleep.",
            goals: &[
                "Reflect grief and guilt accurately",
                "Assess risk without invalidating grief",
                "Build immediate grounding routine",
            ],
            red_flags: &["Persistent hopelessness", "Guilt rumination", "Sleep/appetite disruption"],
        },
    },
    CaseTemplate {
        id: "lgbtq_rejection_family",
        title: "Family rejection and identity distress (high risk)",
        risk_tag: RiskTag::High,
        description: "Practice culturally sensitive, direct safety inquiry.",
        brief: "Client reports rejection and active conflict at home. Goal: establish safety quickly and identify safe contacts.",
        opening: "My family says I'd be better off gone. I feel trapped in that house and I don't know how long I can take it.",
        profile: TemplateProfile {
            title: "Identity-based rejection with acute distress",
            risk_level: "High risk (safety planning required)",
            background: "19-year-old living at home, experiencing verbal hostility and fear of escalation.",
            goals: &[
                "Build affirming alliance fast",
                "Assess immediate intent and means access",
                "Create practical same-day safety steps",
            ],
            red_flags: &["Hostile home environment", "Entrapment", "Escalating despair"],
        },
    },
    CaseTemplate {
        id: "chronic_pain_hopelessness",
        title: "Chronic pain and hopelessness (medium-high risk)",
        risk_tag: RiskTag::High,
        description: "Practice integrating physical suffering with risk assessment.",
        brief: "Client has long-term pain and decreasing hope. Goal: keep empathy while clarifying dangerous thinking patterns.",
        opening: "Pain is there all day, every day. Sometimes I think ending everything would be the only real relief.",
        profile: TemplateProfile {
            title: "Persistent pain with suicidal language",
            risk_level: "Medium-high risk (needs structured assessment)",
            background: "47-year-old with chronic pain, job loss, and reduced daily functioning.",
            goals: &[
                "Validate pain without reinforcing defeat",
                "Clarify ideation, intent, and timeframe",
                "Identify immediate reasons for living and supports",
            ],
            red_flags: &["Pain-related hopelessness", "Functional collapse", "Relief-seeking language"],
        },
    },
    CaseTemplate {
        id: "substance_relapse_spike",
        title: "Relapse spike with self-harm thoughts (high risk)",
        risk_tag: RiskTag::High,
        description: "Practice dual-focus on substance risk and suicidal risk.",
        brief: "Client recently relapsed and reports impulsive dark thoughts. Goal: assess immediate danger and stabilize next 24 hours.",
        opening: "I used again last night and now I hate myself. When I'm like this, I do stupid things and don't care what happens.",
        profile: TemplateProfile {
            title: "Recent relapse with impulsivity",
            risk_level: "High risk (close monitoring and referral readiness)",
            background: "28-year-old with prior sobriety period, recent relapse, shame, and poor impulse control.",
            goals: &[
                "Assess intoxication/withdrawal context",
                "Check self-harm risk directly",
                "Set concrete immediate containment steps",
            ],
            red_flags: &["Impulsivity", "Shame spiral", "Loss of control statements"],
        },
    },
    CaseTemplate {
        id: "older_adult_loneliness",
        title: "Late-life loneliness and burden beliefs (low-medium risk)",
        risk_tag: RiskTag::Low,
        description: "Practice exploring burden beliefs and protective anchors.",
        brief: "Client feels like a burden and disconnected. Goal: assess risk and strengthen social/protective links.",
        opening: "My kids are busy, and I don't want to bother anyone. Some days I wonder if people would be better off without me.",
        profile: TemplateProfile {
            title: "Older adult with loneliness and burden thoughts",
            risk_level: "Low-medium risk (ongoing monitoring)",
            background: "67-year-old living alone after retirement, reduced routine, and growing social isolation.",
            goals: &[
                "Explore burden beliefs gently",
                "Assess ideation and intent clearly",
                "Activate practical connection points",
            ],
            red_flags: &["Burden narrative", "Isolation", "Loss of routine"],
        },
    },
    CaseTemplate {
        id: "international_student_visa_stress",
        title: "Visa stress and academic panic (medium risk)",
        risk_tag: RiskTag::Medium,
        description: "Practice high-pressure problem framing with safety checks.",
        brief: "Client is under severe immigration and academic pressure. Goal: reduce panic, assess risk, and sequence next steps.",
        opening: "If I fail this term, I could lose my visa. I feel trapped and I've started thinking about ending it all.",
        profile: TemplateProfile {
            title: "International student in acute pressure cycle",
            risk_level: "Medium risk (watch for rapid escalation)",
            background: "24-year-old student facing visa uncertainty, financial stress, and limited local support.",
            goals: &[
                "Stabilize panic enough for assessment",
                "Assess risk detail and immediacy",
                "Build short, concrete support actions",
            ],
            red_flags: &["Entrapment", "Catastrophic thinking", "Limited support access"],
        },
    },
];
