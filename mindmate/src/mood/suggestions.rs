use crate::models::{Mood, Suggestion};

/// Static self-help resource for each mood tag.
pub fn suggestion_for(mood: Mood) -> Suggestion {
    let (name, description, link) = match mood {
        Mood::Sad => (
            "PHQ-9 Depression Screening",
            "It seems you've been feeling down for a while. The PHQ-9 is a short \
             questionnaire that can help you reflect on your mood over the last two weeks.",
            "https://www.mdcalc.com/calc/1725/phq-9-patient-health-questionnaire-9",
        ),
        Mood::Distressed => (
            "GAD-7 Anxiety Screening",
            "You've mentioned feeling worried or stressed several times. The GAD-7 is a \
             short questionnaire about anxiety symptoms that may help you understand them.",
            "https://www.mdcalc.com/calc/1727/gad-7-general-anxiety-disorder-7",
        ),
        Mood::Happy | Mood::Neutral => (
            "WHO-5 Well-Being Index",
            "It's great to check in on your overall well-being. The WHO-5 is a quick \
             five-question self-check of how you've been feeling lately.",
            "https://www.psycom.net/self-assessments/who-5-well-being-index",
        ),
        Mood::Angry => (
            "Managing Anger",
            "You've sounded frustrated a few times now. This guide has practical tips for \
             noticing anger early and calming down.",
            "https://www.nhs.uk/mental-health/feelings-symptoms-behaviours/feelings-and-symptoms/anger/",
        ),
    };

    Suggestion {
        mood,
        name: name.to_string(),
        description: description.to_string(),
        link: link.to_string(),
    }
}
