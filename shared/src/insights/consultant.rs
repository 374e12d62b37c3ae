use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WELCOME_MESSAGE: &str = "Hello! I'm your sleep consultant. I can help with \
age-appropriate sleep guidelines, sleep training strategies, nap transitions, night \
waking and bedtime routines. How can I help you today?";

/// Quick-topic buttons: (label, message sent when clicked).
pub const QUICK_TOPICS: [(&str, &str); 6] = [
    ("Sleep Schedule", "What sleep schedule should we follow?"),
    ("Nap Transitions", "How do I handle nap transitions?"),
    ("Sleep Training", "Tell me about sleep training"),
    ("Night Waking", "My baby keeps waking at night"),
    ("Bedtime Routine", "Help me build a bedtime routine"),
    ("Age Guidelines", "What are the sleep guidelines for my baby's age?"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SleepGuideline {
    pub age_group: &'static str,
    /// Inclusive upper bound of the group, in months.
    pub max_months: u32,
    pub total_sleep: &'static str,
    pub night_sleep: &'static str,
    pub naps: &'static str,
    pub nap_duration: &'static str,
    pub wake_windows: &'static str,
    pub tips: &'static [&'static str],
}

pub static SLEEP_GUIDELINES: [SleepGuideline; 6] = [
    SleepGuideline {
        age_group: "Newborn (0-2 months)",
        max_months: 2,
        total_sleep: "15.5-16 hours",
        night_sleep: "8-9 hours",
        naps: "4-5 naps",
        nap_duration: "30 min - 2 hours",
        wake_windows: "45-60 minutes",
        tips: &[
            "Feed on demand every 2-3 hours",
            "Swaddle for security",
            "White noise helps with sleep",
            "Day/night confusion is normal",
        ],
    },
    SleepGuideline {
        age_group: "3-5 months",
        max_months: 5,
        total_sleep: "14.5-15 hours",
        night_sleep: "9-10 hours",
        naps: "3-4 naps",
        nap_duration: "1-2 hours",
        wake_windows: "1.5-2.5 hours",
        tips: &[
            "Start establishing a bedtime routine",
            "Introduce consistent nap times",
            "Watch for sleep cues (rubbing eyes, yawning)",
            "Keep the room dark and quiet",
        ],
    },
    SleepGuideline {
        age_group: "6-8 months",
        max_months: 8,
        total_sleep: "14 hours",
        night_sleep: "10-11 hours",
        naps: "2-3 naps",
        nap_duration: "1-2 hours",
        wake_windows: "2-3 hours",
        tips: &[
            "A solid bedtime routine is crucial",
            "Separation anxiety may affect sleep",
            "Consider dropping the third nap",
            "Keep a consistent wake-up time",
        ],
    },
    SleepGuideline {
        age_group: "9-12 months",
        max_months: 12,
        total_sleep: "13-14 hours",
        night_sleep: "11-12 hours",
        naps: "2 naps",
        nap_duration: "1-2 hours",
        wake_windows: "3-4 hours",
        tips: &[
            "A two-nap schedule is typical",
            "Separation anxiety peaks",
            "Limit screen time before bed",
            "A comfort object can help",
        ],
    },
    SleepGuideline {
        age_group: "1-2 years",
        max_months: 24,
        total_sleep: "11-14 hours",
        night_sleep: "10-12 hours",
        naps: "1-2 naps",
        nap_duration: "1-2 hours",
        wake_windows: "4-6 hours",
        tips: &[
            "Transition to one nap around 15-18 months",
            "Set clear boundaries",
            "Limit caffeine and sugar",
            "Create a calm environment",
        ],
    },
    SleepGuideline {
        age_group: "3-5 years",
        max_months: u32::MAX,
        total_sleep: "10-13 hours",
        night_sleep: "10-12 hours",
        naps: "0-1 nap",
        nap_duration: "~1 hour",
        wake_windows: "6-8 hours",
        tips: &[
            "Most children drop naps by age 4",
            "Keep the bedtime routine",
            "Address fears and anxieties",
        ],
    },
];

pub fn guideline_for_age(months: u32) -> &'static SleepGuideline {
    SLEEP_GUIDELINES
        .iter()
        .find(|g| months <= g.max_months)
        .unwrap_or(&SLEEP_GUIDELINES[SLEEP_GUIDELINES.len() - 1])
}

pub trait InsightGenerator {
    fn generate_insight(&mut self, message: &str) -> String;

    /// How long the view pretends to think before showing the answer.
    fn response_delay_ms(&mut self) -> u32;
}

/// Keyword-driven chatbot, optionally tailored to the selected baby's age.
pub struct SleepConsultant<R: Rng = StdRng> {
    rng: R,
    baby_age_months: Option<u32>,
}

impl SleepConsultant<StdRng> {
    pub fn new(baby_age_months: Option<u32>) -> Self {
        Self::with_rng(StdRng::from_entropy(), baby_age_months)
    }
}

impl<R: Rng> SleepConsultant<R> {
    pub fn with_rng(rng: R, baby_age_months: Option<u32>) -> Self {
        Self {
            rng,
            baby_age_months,
        }
    }

    pub fn set_baby_age(&mut self, months: Option<u32>) {
        self.baby_age_months = months;
    }

    fn guideline(&self) -> Option<(u32, &'static SleepGuideline)> {
        self.baby_age_months.map(|m| (m, guideline_for_age(m)))
    }
}

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn schedule_summary(g: &SleepGuideline) -> String {
    format!(
        "• Total Sleep: {}\n• Night Sleep: {}\n• Naps: {}\n• Nap Duration: {}\n• Wake Windows: {}",
        g.total_sleep, g.night_sleep, g.naps, g.nap_duration, g.wake_windows
    )
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

impl<R: Rng> InsightGenerator for SleepConsultant<R> {
    fn generate_insight(&mut self, message: &str) -> String {
        let lower = message.to_lowercase();

        if contains_any(&lower, &["schedule", "routine"]) {
            return match self.guideline() {
                Some((months, g)) => format!(
                    "Based on your baby's age ({months} months), here's the recommended sleep schedule:\n\n\
                     **{} Guidelines:**\n{}\n\n**Key Tips:**\n{}\n\n\
                     Would you like help creating a personalized schedule?",
                    g.age_group,
                    schedule_summary(g),
                    bullet_list(g.tips)
                ),
                None => "I'd be happy to help with sleep schedules! Could you tell me your \
                         baby's age so I can give age-appropriate recommendations?"
                    .to_string(),
            };
        }

        if contains_any(&lower, &["nap", "transition"]) {
            return match self.guideline() {
                Some((_, g)) => format!(
                    "For {}, nap transitions usually follow these milestones:\n\n\
                     **Current Stage:** {}\n**Nap Duration:** {}\n\n\
                     **Signs a transition is coming:**\n{}\n\n\
                     **Tips:**\n{}",
                    g.age_group,
                    g.naps,
                    g.nap_duration,
                    bullet_list(&[
                        "Fighting naps",
                        "Taking longer to fall asleep",
                        "Waking early from naps",
                        "Difficulty falling asleep at bedtime",
                    ]),
                    bullet_list(&[
                        "Shift times gradually, 15-30 minutes at a time",
                        "Keep wake-up times consistent",
                        "Give each change one to two weeks",
                    ])
                ),
                None => "I can help with nap transitions! What's your baby's age and current \
                         nap schedule?"
                    .to_string(),
            };
        }

        if contains_any(&lower, &["training", "cry"]) {
            return format!(
                "Sleep training is a personal decision to make when you and your baby are ready.\n\n\
                 **Gentle methods:**\n{}\n\n**When to start:**\n{}\n\n\
                 Always check with your pediatrician first, and stay consistent for at least one to two weeks.",
                bullet_list(&[
                    "Pick Up, Put Down: pick up when crying, put down when calm",
                    "Fading: gradually reduce your presence",
                    "Camping Out: sit near the crib and move a little further each night",
                    "Ferber Method: progressive waiting with check-ins",
                ]),
                bullet_list(&[
                    "Baby is 4-6 months old",
                    "Baby is healthy and gaining weight",
                    "You're ready to be consistent",
                ])
            );
        }

        if contains_any(&lower, &["wake", "night"]) {
            return format!(
                "Night waking is normal and expected!\n\n**Common causes:**\n{}\n\n\
                 **Typical night feedings:**\n{}\n\n\
                 What's your baby's age and current night waking pattern?",
                bullet_list(&[
                    "Hunger (especially under 6 months)",
                    "Developmental milestones",
                    "Teething or illness",
                    "Separation anxiety",
                    "Sleep associations",
                ]),
                bullet_list(&[
                    "0-3 months: 2-4 feedings per night",
                    "3-6 months: 1-3 feedings per night",
                    "6-12 months: 0-2 feedings per night",
                    "12+ months: usually 0-1",
                ])
            );
        }

        if lower.contains("bedtime") {
            return format!(
                "A consistent bedtime routine is key to good sleep. A 30-45 minute routine could be:\n\n{}\n\n\
                 Start at the same time every night and avoid screens for an hour before bed.",
                [
                    "1. Bath time",
                    "2. Massage",
                    "3. Pajamas and diaper change",
                    "4. Feeding",
                    "5. Reading books",
                    "6. Lullaby or white noise",
                    "7. Goodnight",
                ]
                .join("\n")
            );
        }

        if contains_any(&lower, &["age", "guideline"]) {
            return match self.guideline() {
                Some((months, g)) => format!(
                    "Here are the sleep guidelines for your {months}-month-old:\n\n\
                     **{} Sleep Requirements:**\n{}\n\n**Expert Tips:**\n{}",
                    g.age_group,
                    schedule_summary(g),
                    bullet_list(g.tips)
                ),
                None => "I'd love to share age-specific guidelines! How old is your baby in months?"
                    .to_string(),
            };
        }

        format!(
            "I understand you're asking about \"{}\". I can help with sleep schedules, nap \
             transitions, sleep training, night waking and age-appropriate guidelines. Could you \
             tell me your baby's age and the specific challenge you're facing?",
            message.trim()
        )
    }

    fn response_delay_ms(&mut self) -> u32 {
        self.rng.gen_range(1_000..3_000)
    }
}
