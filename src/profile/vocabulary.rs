//! Curated skill and job-title vocabularies
//!
//! Both are matched as whole phrases over normalized (lowercased) text, so
//! symbolic skills such as `c++`, `ci/cd` or multi-word ones such as
//! `machine learning` survive even though the tokenizer would split them.

use crate::error::{JobScoutError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::{HashMap, HashSet};

/// Whole-phrase matcher over lowercased text
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    matcher: AhoCorasick,
    phrases: Vec<String>,
}

impl PhraseMatcher {
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&phrases)
            .map_err(|e| JobScoutError::Configuration(format!("Failed to build phrase matcher: {}", e)))?;

        Ok(Self { matcher, phrases })
    }

    /// `(phrase index, byte offset)` of every whole-word match.
    ///
    /// Among whole-word candidates the leftmost longest wins and the scan
    /// resumes after it, so a rejected long alias never hides a shorter one
    /// starting at the same offset.
    pub fn find_iter(&self, text: &str) -> impl Iterator<Item = (usize, usize)> {
        let mut candidates: Vec<(usize, usize, usize)> = self
            .matcher
            .find_overlapping_iter(text)
            .filter(|m| is_word_boundary(text, m.start(), m.end()))
            .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut accepted = Vec::new();
        let mut resume_at = 0;
        for (start, end, pattern) in candidates {
            if start >= resume_at {
                accepted.push((pattern, start));
                resume_at = end;
            }
        }
        accepted.into_iter()
    }

    pub fn phrase(&self, index: usize) -> &str {
        &self.phrases[index]
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Count whole-word occurrences of `phrase` in lowercased `text`
pub fn count_phrase(text: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    text.match_indices(phrase)
        .filter(|(start, _)| is_word_boundary(text, *start, start + phrase.len()))
        .count()
}

const DEFAULT_SKILLS: &[&str] = &[
    // Languages
    "python", "javascript", "typescript", "java", "c++", "c#", "golang", "rust", "ruby",
    "php", "swift", "kotlin", "scala", "matlab",
    // Web
    "react", "react native", "vue", "angular", "svelte", "html", "css", "sass", "tailwind",
    "bootstrap", "jquery", "node.js", "node", "express", "next.js", "django", "flask",
    "fastapi", "spring boot", "graphql", "rest api", "flutter",
    // Data
    "sql", "mysql", "postgresql", "mongodb", "redis", "sqlite", "oracle", "elasticsearch",
    "pandas", "numpy", "scikit-learn", "spark", "hadoop", "kafka", "airflow", "etl",
    "power bi", "tableau", "excel",
    // ML
    "machine learning", "deep learning", "data science", "ai", "nlp", "computer vision",
    "tensorflow", "pytorch",
    // Infrastructure
    "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "ansible", "jenkins",
    "ci/cd", "devops", "linux", "git", "microservices",
    // Testing
    "selenium", "playwright", "cypress", "pytest", "jest", "junit", "testing",
    // Process
    "agile", "scrum", "kanban", "jira",
    // Marketing and commerce
    "seo", "sem", "google ads", "meta ads", "analytics", "social media", "a/b testing",
    "shopify", "woocommerce", "erp", "e-commerce",
    // Design
    "figma", "photoshop", "illustrator", "indesign", "ui/ux",
];

/// Technical skill vocabulary
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    matcher: PhraseMatcher,
}

impl SkillVocabulary {
    pub fn new(extra_skills: &[String]) -> Result<Self> {
        let skills = DEFAULT_SKILLS
            .iter()
            .map(|s| s.to_string())
            .chain(extra_skills.iter().cloned());
        Ok(Self {
            matcher: PhraseMatcher::new(skills)?,
        })
    }

    /// Distinct skills present in normalized text, in order of first appearance
    pub fn find(&self, normalized: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.matcher
            .find_iter(normalized)
            .filter(|(idx, _)| seen.insert(*idx))
            .map(|(idx, _)| self.matcher.phrase(idx).to_string())
            .collect()
    }
}

struct TitleRule {
    title: &'static str,
    aliases: &'static [&'static str],
    signals: &'static [&'static str],
}

const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        title: "Full Stack Developer",
        aliases: &["full stack developer", "full-stack developer", "fullstack developer", "full stack", "full-stack", "fullstack"],
        signals: &["react", "javascript", "python", "django", "flask", "html", "css", "node.js"],
    },
    TitleRule {
        title: "Backend Developer",
        aliases: &["backend developer", "back-end developer", "back end developer", "backend engineer"],
        signals: &["python", "flask", "django", "fastapi", "sql", "postgresql", "rest api", "spring boot"],
    },
    TitleRule {
        title: "Frontend Developer",
        aliases: &["frontend developer", "front-end developer", "front end developer", "frontend engineer"],
        signals: &["react", "javascript", "html", "css", "vue", "angular", "typescript"],
    },
    TitleRule {
        title: "Python Developer",
        aliases: &["python developer", "python engineer"],
        signals: &["python", "django", "flask", "fastapi", "pandas"],
    },
    TitleRule {
        title: "Software Engineer",
        aliases: &["software engineer", "yazılım mühendisi"],
        signals: &["git", "agile", "microservices", "testing"],
    },
    TitleRule {
        title: "Software Developer",
        aliases: &["software developer", "yazılım geliştirici", "yazılım uzmanı"],
        signals: &["git", "java", "c#", "c++"],
    },
    TitleRule {
        title: "Data Analyst",
        aliases: &["data analyst", "veri analisti"],
        signals: &["sql", "excel", "pandas", "power bi", "tableau", "analytics"],
    },
    TitleRule {
        title: "Data Engineer",
        aliases: &["data engineer", "veri mühendisi"],
        signals: &["etl", "spark", "airflow", "kafka", "hadoop", "sql"],
    },
    TitleRule {
        title: "Data Scientist",
        aliases: &["data scientist", "veri bilimci"],
        signals: &["machine learning", "pandas", "numpy", "scikit-learn", "data science"],
    },
    TitleRule {
        title: "Machine Learning Engineer",
        aliases: &["machine learning engineer", "ml engineer", "ai engineer", "yapay zeka mühendisi"],
        signals: &["machine learning", "deep learning", "tensorflow", "pytorch", "nlp", "computer vision"],
    },
    TitleRule {
        title: "DevOps Engineer",
        aliases: &["devops engineer", "site reliability engineer", "sre"],
        signals: &["docker", "kubernetes", "aws", "azure", "terraform", "ansible", "jenkins", "ci/cd"],
    },
    TitleRule {
        title: "Automation Engineer",
        aliases: &["automation engineer", "test automation engineer", "qa automation", "otomasyon mühendisi"],
        signals: &["selenium", "playwright", "cypress", "pytest", "testing"],
    },
    TitleRule {
        title: "Mobile Developer",
        aliases: &["mobile developer", "ios developer", "android developer"],
        signals: &["swift", "kotlin", "flutter", "react native"],
    },
    TitleRule {
        title: "Product Manager",
        aliases: &["product manager", "ürün yöneticisi"],
        signals: &["agile", "scrum", "jira", "roadmap", "stakeholder"],
    },
    TitleRule {
        title: "Project Manager",
        aliases: &["project manager", "proje yöneticisi"],
        signals: &["agile", "scrum", "kanban", "jira", "budget"],
    },
    TitleRule {
        title: "Digital Marketing Specialist",
        aliases: &["digital marketing specialist", "digital marketing", "dijital pazarlama"],
        signals: &["seo", "sem", "google ads", "meta ads", "social media", "content"],
    },
    TitleRule {
        title: "Growth Engineer",
        aliases: &["growth engineer", "growth hacker", "growth marketing"],
        signals: &["seo", "analytics", "google ads", "meta ads", "a/b testing"],
    },
    TitleRule {
        title: "E-commerce Specialist",
        aliases: &["e-commerce specialist", "e-commerce manager", "e-ticaret uzmanı"],
        signals: &["shopify", "woocommerce", "erp", "e-commerce"],
    },
    TitleRule {
        title: "Graphic Designer",
        aliases: &["graphic designer", "grafik tasarımcı"],
        signals: &["photoshop", "illustrator", "indesign", "figma"],
    },
    TitleRule {
        title: "UI/UX Designer",
        aliases: &["ui/ux designer", "ux designer", "ui designer", "product designer"],
        signals: &["figma", "ui/ux", "prototyping", "wireframes"],
    },
];

/// Job-title vocabulary: alias phrases plus skill signals per title
pub struct TitleVocabulary {
    matcher: PhraseMatcher,
    alias_owner: Vec<usize>,
}

#[derive(Debug, Default, Clone, Copy)]
struct TitleEvidence {
    phrase_hits: usize,
    first_position: usize,
}

impl TitleVocabulary {
    pub fn new() -> Result<Self> {
        let mut aliases = Vec::new();
        let mut alias_owner = Vec::new();
        for (rule_idx, rule) in TITLE_RULES.iter().enumerate() {
            for alias in rule.aliases {
                aliases.push(*alias);
                alias_owner.push(rule_idx);
            }
        }

        Ok(Self {
            matcher: PhraseMatcher::new(aliases)?,
            alias_owner,
        })
    }

    /// Rank candidate titles for a normalized document.
    ///
    /// Titles named in the text come first, by number of mentions and then by
    /// earliest mention. Titles only implied by at least `min_signals` of
    /// their skill signals in `present_terms` follow, by signal count. Never
    /// returns an empty list: `fallback` stands in when nothing matched.
    pub fn infer(
        &self,
        normalized: &str,
        present_terms: &HashSet<String>,
        max_titles: usize,
        min_signals: usize,
        fallback: &str,
    ) -> Vec<String> {
        let mut evidence: HashMap<usize, TitleEvidence> = HashMap::new();
        for (alias_idx, position) in self.matcher.find_iter(normalized) {
            let rule_idx = self.alias_owner[alias_idx];
            let entry = evidence.entry(rule_idx).or_insert(TitleEvidence {
                phrase_hits: 0,
                first_position: position,
            });
            entry.phrase_hits += 1;
            entry.first_position = entry.first_position.min(position);
        }

        let mut named: Vec<(usize, TitleEvidence)> = evidence.into_iter().collect();
        named.sort_by(|(_, a), (_, b)| {
            b.phrase_hits
                .cmp(&a.phrase_hits)
                .then(a.first_position.cmp(&b.first_position))
        });

        let mut implied: Vec<(usize, usize)> = TITLE_RULES
            .iter()
            .enumerate()
            .filter(|(idx, _)| !named.iter().any(|(n, _)| n == idx))
            .map(|(idx, rule)| {
                let signals = rule
                    .signals
                    .iter()
                    .filter(|s| present_terms.contains(**s))
                    .count();
                (idx, signals)
            })
            .filter(|(_, signals)| min_signals > 0 && *signals >= min_signals)
            .collect();
        // stable: equal signal counts keep table order
        implied.sort_by(|a, b| b.1.cmp(&a.1));

        let max_titles = max_titles.clamp(1, 5);
        let titles: Vec<String> = named
            .into_iter()
            .map(|(idx, _)| idx)
            .chain(implied.into_iter().map(|(idx, _)| idx))
            .take(max_titles)
            .map(|idx| TITLE_RULES[idx].title.to_string())
            .collect();

        if titles.is_empty() {
            vec![fallback.to_string()]
        } else {
            titles
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_symbolic_and_multiword_skills() {
        let vocab = SkillVocabulary::new(&[]).unwrap();
        let found = vocab.find("c++ and c# with ci/cd pipelines, machine learning on node.js");

        assert!(found.contains(&"c++".to_string()));
        assert!(found.contains(&"c#".to_string()));
        assert!(found.contains(&"ci/cd".to_string()));
        assert!(found.contains(&"machine learning".to_string()));
        assert!(found.contains(&"node.js".to_string()));
        assert!(!found.contains(&"node".to_string()));
    }

    #[test]
    fn test_skills_respect_word_boundaries() {
        let vocab = SkillVocabulary::new(&[]).unwrap();
        let found = vocab.find("javascript developer who likes gitlab and said hello");

        assert!(found.contains(&"javascript".to_string()));
        assert!(!found.contains(&"java".to_string()));
        assert!(!found.contains(&"git".to_string()));
        assert!(!found.contains(&"ai".to_string()));
    }

    #[test]
    fn test_extra_skills_extend_vocabulary() {
        let vocab = SkillVocabulary::new(&["Bevy".to_string()]).unwrap();
        assert!(vocab.find("built games with bevy").contains(&"bevy".to_string()));
    }

    #[test]
    fn test_count_phrase() {
        assert_eq!(count_phrase("docker, docker-compose and dockerfile", "docker"), 2);
        assert_eq!(count_phrase("anything", ""), 0);
    }

    #[test]
    fn test_titles_ranked_by_frequency_then_position() {
        let vocab = TitleVocabulary::new().unwrap();
        let text = "data analyst at acme. backend developer at initech. backend developer again.";
        let titles = vocab.infer(text, &HashSet::new(), 5, 2, "General Candidate");

        assert_eq!(titles[0], "Backend Developer");
        assert_eq!(titles[1], "Data Analyst");
    }

    #[test]
    fn test_earlier_mention_breaks_ties() {
        let vocab = TitleVocabulary::new().unwrap();
        let titles = vocab.infer("devops engineer then data engineer", &HashSet::new(), 5, 2, "x");
        assert_eq!(titles, vec!["DevOps Engineer".to_string(), "Data Engineer".to_string()]);
    }

    #[test]
    fn test_signals_imply_titles_after_named_ones() {
        let vocab = TitleVocabulary::new().unwrap();
        let present = terms(&["docker", "kubernetes", "jenkins"]);
        let titles = vocab.infer("python developer", &present, 5, 2, "x");

        assert_eq!(titles[0], "Python Developer");
        assert!(titles.contains(&"DevOps Engineer".to_string()));
    }

    #[test]
    fn test_plural_title_falls_back_to_shorter_alias() {
        let vocab = TitleVocabulary::new().unwrap();
        let titles = vocab.infer("mentored full stack developers", &HashSet::new(), 5, 2, "General Candidate");
        assert_eq!(titles, vec!["Full Stack Developer".to_string()]);
    }

    #[test]
    fn test_longest_whole_word_match_wins() {
        let matcher = PhraseMatcher::new(["react", "react native", "node", "node.js"]).unwrap();
        let found: Vec<&str> = matcher
            .find_iter("react native apps on node.js")
            .map(|(idx, _)| matcher.phrase(idx))
            .collect();
        assert_eq!(found, vec!["react native", "node.js"]);
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let vocab = TitleVocabulary::new().unwrap();
        let titles = vocab.infer("gardening and baking", &terms(&["gardening"]), 5, 2, "General Candidate");
        assert_eq!(titles, vec!["General Candidate".to_string()]);
    }

    #[test]
    fn test_title_count_is_capped() {
        let vocab = TitleVocabulary::new().unwrap();
        let text = "data analyst, data engineer, data scientist, devops engineer, sre, \
                    product manager, project manager, graphic designer";
        let titles = vocab.infer(text, &HashSet::new(), 9, 2, "x");
        assert_eq!(titles.len(), 5);
    }
}
