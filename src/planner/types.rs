use std::fmt;

use serde::Deserialize;

use crate::client::GenAiError;

/// Meal slot of a recipe within the daily plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MealSlot::Breakfast => "早餐",
            MealSlot::Lunch => "午餐",
            MealSlot::Dinner => "晚餐",
        };
        write!(f, "{label}")
    }
}

/// One meal's structured description.
///
/// `image_url` stays `None` until image resolution completes; once set it is
/// either a data URI or the fixed placeholder, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub slot: MealSlot,
    pub title: String,
    pub ingredients: Vec<String>,
    pub cooking_method: String,
    pub benefits: String,
    pub image_prompt: String,
    pub image_url: Option<String>,
}

/// The daily set of three recipes plus one tip. Replaced wholesale on each
/// fetch; individual recipes are patched in place as images resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPlan {
    pub date: String,
    pub breakfast: Recipe,
    pub lunch: Recipe,
    pub dinner: Recipe,
    pub daily_tip: String,
}

impl DailyPlan {
    pub fn recipe(&self, slot: MealSlot) -> &Recipe {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub fn recipe_mut(&mut self, slot: MealSlot) -> &mut Recipe {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    pub fn recipes(&self) -> [&Recipe; 3] {
        [&self.breakfast, &self.lunch, &self.dinner]
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct PlanPayload {
    breakfast: RecipePayload,
    lunch: RecipePayload,
    dinner: RecipePayload,
    #[serde(rename = "dailyTip")]
    daily_tip: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RecipePayload {
    title: String,
    ingredients: Vec<String>,
    #[serde(rename = "cookingMethod")]
    cooking_method: String,
    benefits: String,
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
}

impl RecipePayload {
    fn validate(&self, slot: MealSlot) -> Result<(), GenAiError> {
        let missing = if self.title.trim().is_empty() {
            Some("title")
        } else if self.ingredients.iter().all(|item| item.trim().is_empty()) {
            Some("ingredients")
        } else if self.cooking_method.trim().is_empty() {
            Some("cookingMethod")
        } else if self.benefits.trim().is_empty() {
            Some("benefits")
        } else if self.image_prompt.trim().is_empty() {
            Some("imagePrompt")
        } else {
            None
        };

        match missing {
            Some(field) => Err(GenAiError::Schema(format!(
                "{slot} recipe has an empty {field}"
            ))),
            None => Ok(()),
        }
    }

    fn into_recipe(self, slot: MealSlot) -> Recipe {
        Recipe {
            slot,
            title: self.title,
            ingredients: self.ingredients,
            cooking_method: self.cooking_method,
            benefits: self.benefits,
            image_prompt: self.image_prompt,
            image_url: None,
        }
    }
}

impl PlanPayload {
    pub(super) fn into_plan(self, date: String) -> Result<DailyPlan, GenAiError> {
        if self.daily_tip.trim().is_empty() {
            return Err(GenAiError::Schema("dailyTip is empty".to_string()));
        }
        self.breakfast.validate(MealSlot::Breakfast)?;
        self.lunch.validate(MealSlot::Lunch)?;
        self.dinner.validate(MealSlot::Dinner)?;

        Ok(DailyPlan {
            date,
            breakfast: self.breakfast.into_recipe(MealSlot::Breakfast),
            lunch: self.lunch.into_recipe(MealSlot::Lunch),
            dinner: self.dinner.into_recipe(MealSlot::Dinner),
            daily_tip: self.daily_tip,
        })
    }
}
