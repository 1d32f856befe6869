use serde_json::{Value, json};

/// Instruction sent with every plan request, stamped with today's date.
pub(super) fn build_plan_prompt(date: &str) -> String {
    format!(
        "你是专门负责55-75岁老年人健康管理的营养专家。请为今天({date})生成一份完整的养生食谱。\
         要求：清淡、易消化、少油少盐少糖，符合中国家庭日常饮食习惯，语言通俗、亲切。\
         包含早餐、午餐、晚餐和一条养生小贴士。早餐需包含主食、蛋白质和蔬菜。"
    )
}

fn recipe_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "ingredients": {"type": "ARRAY", "items": {"type": "STRING"}},
            "cookingMethod": {"type": "STRING"},
            "benefits": {"type": "STRING"},
            "imagePrompt": {"type": "STRING"}
        },
        "required": ["title", "ingredients", "cookingMethod", "benefits", "imagePrompt"]
    })
}

/// Strict output schema for the plan request: all four top-level fields and
/// every recipe field are mandatory.
pub(super) fn plan_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "breakfast": recipe_schema(),
            "lunch": recipe_schema(),
            "dinner": recipe_schema(),
            "dailyTip": {"type": "STRING"}
        },
        "required": ["breakfast", "lunch", "dinner", "dailyTip"]
    })
}
