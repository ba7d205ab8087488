//! # Feature: Contests
//!
//! Student competition listings with registration deadlines. Records live in
//! the `contests` table; a built-in set seeds an empty database.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//! - **Toggleable**: false

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    /// Row id; `None` until stored
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub url: String,
    /// Deadline as `YYYY-MM-DD`
    pub deadline: String,
}

impl Contest {
    pub fn new(name: &str, description: &str, url: &str, deadline: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            deadline: deadline.to_string(),
        }
    }

    /// Days from `today` until the deadline; negative once passed.
    /// `None` when the stored deadline is not a date.
    pub fn days_until_deadline(&self, today: chrono::NaiveDate) -> Option<i64> {
        chrono::NaiveDate::parse_from_str(&self.deadline, "%Y-%m-%d")
            .ok()
            .map(|deadline| (deadline - today).num_days())
    }
}

pub fn default_contests() -> Vec<Contest> {
    vec![
        Contest::new(
            "全国大学生数学建模竞赛",
            "培养创新意识和团队协作精神",
            "https://www.mcm.edu.cn",
            "2024-06-01",
        ),
        Contest::new(
            "中国国际大学生创新大赛",
            "激发大学生创新创业热情",
            "https://cy.ncss.org.cn",
            "2024-05-15",
        ),
        Contest::new(
            "全国大学生电子设计竞赛",
            "提高电子设计制作能力",
            "http://www.nuedc.com.cn",
            "2024-07-01",
        ),
        Contest::new(
            "全国大学生英语竞赛",
            "提高英语水平和应用能力",
            "https://www.chinaneccs.cn",
            "2024-04-15",
        ),
        Contest::new(
            "陕西省大学生程序设计竞赛",
            "展示程序设计能力和创新思维",
            "https://www.xajld.com",
            "2024-05-01",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_contests() {
        let contests = default_contests();
        assert_eq!(contests.len(), 5);
        assert!(contests.iter().all(|c| c.id.is_none()));
    }

    #[test]
    fn test_days_until_deadline() {
        let contest = Contest::new("a", "b", "c", "2024-06-01");
        let today = NaiveDate::from_ymd_opt(2024, 5, 30).unwrap();
        assert_eq!(contest.days_until_deadline(today), Some(2));

        let undated = Contest::new("a", "b", "c", "长期有效");
        assert_eq!(undated.days_until_deadline(today), None);
    }
}
