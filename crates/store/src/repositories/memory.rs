use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::info;

use promo_core::domain::rule::{Rule, RuleId};
use promo_core::exclusivity;

use super::{RepositoryError, RuleRepository};

/// In-memory rule store. Every write that can flip activation state runs
/// under one write guard over the whole rule set, so an exclusivity batch is
/// applied atomically: either the activated rule and all its planned
/// deactivations land together, or none of them do.
#[derive(Default)]
pub struct InMemoryRuleRepository {
    rules: RwLock<BTreeMap<RuleId, Rule>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(rules: &BTreeMap<RuleId, Rule>, active_only: bool) -> Vec<Rule> {
        let mut result: Vec<Rule> =
            rules.values().filter(|rule| !active_only || rule.active).cloned().collect();
        // Stable sort over an id-ordered map: priority ties stay in id order.
        result.sort_by_key(|rule| rule.priority);
        result
    }

    /// Shared write path for saves and activations. Expects the caller to
    /// hold the write guard, so the whole batch is one atomic step.
    fn persist_active(rules: &mut BTreeMap<RuleId, Rule>, mut rule: Rule) -> RuleId {
        if !rule.is_persisted() {
            let next = rules.keys().map(|id| id.0).max().unwrap_or(0) + 1;
            rule.id = RuleId(next);
        }

        // A rule saved without a category inherits its condition kind.
        if rule.category.is_empty() && !rule.condition.kind.is_empty() {
            rule.category = rule.condition.kind.clone();
        }

        if rule.active {
            let snapshot: Vec<Rule> = rules.values().cloned().collect();
            let plan = exclusivity::plan_deactivations(&rule, &snapshot);
            for id in &plan.deactivate {
                if let Some(other) = rules.get_mut(id) {
                    other.active = false;
                    info!(
                        deactivated = id.0,
                        activated = rule.id.0,
                        category = %plan.category,
                        "deactivated rule outside the active category"
                    );
                }
            }
        }

        let id = rule.id;
        rules.insert(id, rule);
        id
    }
}

#[async_trait::async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn find_by_id(&self, id: RuleId) -> Result<Option<Rule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(rules.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Rule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(Self::sorted(&rules, false))
    }

    async fn list_active(&self) -> Result<Vec<Rule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(Self::sorted(&rules, true))
    }

    async fn save(&self, rule: Rule) -> Result<RuleId, RepositoryError> {
        let mut rules = self.rules.write().await;
        Ok(Self::persist_active(&mut rules, rule))
    }

    async fn delete(&self, id: RuleId) -> Result<bool, RepositoryError> {
        let mut rules = self.rules.write().await;
        Ok(rules.remove(&id).is_some())
    }

    async fn activate(&self, id: RuleId) -> Result<(), RepositoryError> {
        let mut rules = self.rules.write().await;
        let mut rule = rules.get(&id).cloned().ok_or(RepositoryError::NotFound(id))?;
        rule.active = true;
        Self::persist_active(&mut rules, rule);
        Ok(())
    }

    async fn toggle(&self, id: RuleId) -> Result<bool, RepositoryError> {
        let mut rules = self.rules.write().await;
        let mut rule = rules.get(&id).cloned().ok_or(RepositoryError::NotFound(id))?;

        if rule.active {
            rule.active = false;
            rules.insert(id, rule);
            info!(deactivated = id.0, "deactivated rule");
            return Ok(false);
        }

        rule.active = true;
        Self::persist_active(&mut rules, rule);
        Ok(true)
    }

    async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rules = self.rules.read().await;
        let mut categories: Vec<String> = Vec::new();
        for rule in rules.values() {
            if !rule.category.is_empty() && !categories.contains(&rule.category) {
                categories.push(rule.category.clone());
            }
        }
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use promo_core::domain::rule::{Action, Condition, Rule, RuleId};

    use crate::repositories::{InMemoryRuleRepository, RepositoryError, RuleRepository};

    fn cart_total_rule(name: &str) -> Rule {
        Rule::new(
            name,
            Condition::cart_total(Decimal::new(10_000, 2)),
            Action::percentage_discount(Decimal::TEN),
        )
    }

    fn item_count_rule(name: &str) -> Rule {
        Rule::new(name, Condition::item_count(3), Action::cheapest_free())
    }

    #[tokio::test]
    async fn saves_assign_incrementing_ids_to_new_rules() {
        let repo = InMemoryRuleRepository::new();

        let first = repo.save(cart_total_rule("first")).await.expect("save first");
        let second = repo.save(cart_total_rule("second")).await.expect("save second");

        assert_eq!(first, RuleId(1));
        assert_eq!(second, RuleId(2));
    }

    #[tokio::test]
    async fn a_saved_rule_round_trips() {
        let repo = InMemoryRuleRepository::new();

        let id = repo.save(cart_total_rule("round trip")).await.expect("save");
        let found = repo.find_by_id(id).await.expect("find");

        assert_eq!(found.map(|rule| rule.name), Some("round trip".to_string()));
    }

    #[tokio::test]
    async fn an_empty_category_defaults_to_the_condition_kind() {
        let repo = InMemoryRuleRepository::new();

        let id = repo.save(cart_total_rule("uncategorized")).await.expect("save");
        let saved = repo.find_by_id(id).await.expect("find").expect("present");

        assert_eq!(saved.category, "cart_total");
    }

    #[tokio::test]
    async fn saving_an_active_rule_deactivates_competing_categories() {
        let repo = InMemoryRuleRepository::new();

        let total_id = repo.save(cart_total_rule("totals")).await.expect("save totals");
        repo.save(item_count_rule("counts")).await.expect("save counts");

        let totals = repo.find_by_id(total_id).await.expect("find").expect("present");
        assert!(!totals.active);

        let active = repo.list_active().await.expect("list active");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].category, "item_count");
    }

    #[tokio::test]
    async fn activation_is_batch_atomic_across_the_rule_set() {
        let repo = InMemoryRuleRepository::new();

        let total_id = repo.save(cart_total_rule("totals")).await.expect("save totals");
        let count_id = repo.save(item_count_rule("counts")).await.expect("save counts");

        repo.activate(total_id).await.expect("activate totals");

        let categories_active: Vec<String> = repo
            .list_active()
            .await
            .expect("list active")
            .into_iter()
            .map(|rule| rule.category)
            .collect();
        assert_eq!(categories_active, vec!["cart_total".to_string()]);

        let counts = repo.find_by_id(count_id).await.expect("find").expect("present");
        assert!(!counts.active);
    }

    #[tokio::test]
    async fn toggling_off_is_plain_and_toggling_on_reclaims_the_category() {
        let repo = InMemoryRuleRepository::new();

        let total_id = repo.save(cart_total_rule("totals")).await.expect("save totals");
        repo.save(item_count_rule("counts")).await.expect("save counts");

        // totals was deactivated by the second save; toggling it back on
        // must deactivate the item_count rule in turn.
        let state = repo.toggle(total_id).await.expect("toggle on");
        assert!(state);

        let active = repo.list_active().await.expect("list active");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, total_id);

        let state = repo.toggle(total_id).await.expect("toggle off");
        assert!(!state);
        assert!(repo.list_active().await.expect("list active").is_empty());
    }

    #[tokio::test]
    async fn deleting_reports_whether_anything_was_removed() {
        let repo = InMemoryRuleRepository::new();
        let id = repo.save(cart_total_rule("doomed")).await.expect("save");

        assert!(repo.delete(id).await.expect("delete"));
        assert!(!repo.delete(id).await.expect("delete again"));
        assert_eq!(repo.find_by_id(id).await.expect("find"), None);
    }

    #[tokio::test]
    async fn unknown_ids_surface_not_found() {
        let repo = InMemoryRuleRepository::new();

        let error = repo.activate(RuleId(99)).await.expect_err("missing rule");

        assert!(matches!(error, RepositoryError::NotFound(RuleId(99))));
    }

    #[tokio::test]
    async fn listings_sort_by_priority_with_id_order_ties() {
        let repo = InMemoryRuleRepository::new();

        repo.save(cart_total_rule("late").with_priority(20)).await.expect("save late");
        repo.save(cart_total_rule("early").with_priority(5)).await.expect("save early");
        repo.save(cart_total_rule("tied").with_priority(5)).await.expect("save tied");

        let names: Vec<String> =
            repo.list().await.expect("list").into_iter().map(|rule| rule.name).collect();

        assert_eq!(names, vec!["early".to_string(), "tied".to_string(), "late".to_string()]);
    }

    #[tokio::test]
    async fn categories_lists_distinct_non_empty_values() {
        let repo = InMemoryRuleRepository::new();

        repo.save(cart_total_rule("a")).await.expect("save a");
        repo.save(cart_total_rule("b")).await.expect("save b");
        repo.save(item_count_rule("c")).await.expect("save c");

        let categories = repo.categories().await.expect("categories");

        assert_eq!(categories, vec!["cart_total".to_string(), "item_count".to_string()]);
    }
}
