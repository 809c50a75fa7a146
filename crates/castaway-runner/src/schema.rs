//! Tool schemas offered to the model.
//!
//! Each action is one tool whose JSON-schema parameters mirror the
//! argument record of the matching [`castaway_types::ActionCall`] variant,
//! so a returned call deserializes straight into the enum. Children are
//! only offered `move` and `communicate`.

use castaway_types::{LifeStage, Recipe, Resource, StructureType};
use serde::Serialize;
use serde_json::{Value, json};

/// Names of every action the engine understands.
pub const ACTION_NAMES: [&str; 8] = [
    "move",
    "communicate",
    "gather",
    "craft",
    "build",
    "create_crop_field",
    "harvest_crop",
    "give_resource",
];

/// One tool definition, backend-neutral.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    /// Tool name, identical to the action's serialized tag.
    pub name: &'static str,
    /// What the tool does, for the model.
    pub description: &'static str,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

impl ToolSpec {
    /// Shape for `OpenAI`-compatible `tools` arrays.
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }

    /// Shape for Anthropic `tools` arrays.
    pub fn to_anthropic(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.parameters,
        })
    }
}

/// Tools available to an agent at `status`.
pub fn tools_for(status: LifeStage) -> Vec<ToolSpec> {
    let mut tools = vec![move_tool(), communicate_tool()];
    if status != LifeStage::Child {
        tools.extend([
            gather_tool(),
            craft_tool(),
            build_tool(),
            create_crop_field_tool(),
            harvest_crop_tool(),
            give_resource_tool(),
        ]);
    }
    tools
}

/// Whether `name` is one of the engine's actions.
pub fn is_known_action(name: &str) -> bool {
    ACTION_NAMES.contains(&name)
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

fn position_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            "x": {"type": "integer", "description": "Column"},
            "y": {"type": "integer", "description": "Row"}
        },
        "required": ["x", "y"]
    })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn resource_names(natural_only: bool) -> Vec<&'static str> {
    Resource::ALL
        .into_iter()
        .filter(|r| !natural_only || r.is_natural())
        .map(Resource::as_str)
        .collect()
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

fn move_tool() -> ToolSpec {
    ToolSpec {
        name: "move",
        description: "Walk to a nearby walkable tile.",
        parameters: object(json!({ "to": position_schema("Destination tile") }), &["to"]),
    }
}

fn communicate_tool() -> ToolSpec {
    ToolSpec {
        name: "communicate",
        description: "Say something to agents you can see.",
        parameters: object(
            json!({
                "recipients": {
                    "type": "array",
                    "description": "Ids of the listeners",
                    "items": {"type": "string"}
                },
                "message": {"type": "string", "description": "What to say"}
            }),
            &["recipients", "message"],
        ),
    }
}

fn gather_tool() -> ToolSpec {
    ToolSpec {
        name: "gather",
        description: "Take one unit of a natural resource from a tile within reach, or from items dropped there.",
        parameters: object(
            json!({
                "resource": {"type": "string", "enum": resource_names(true)},
                "at": position_schema("Tile to gather from")
            }),
            &["resource", "at"],
        ),
    }
}

fn craft_tool() -> ToolSpec {
    let recipes: Vec<&str> = Recipe::ALL.into_iter().map(Recipe::as_str).collect();
    ToolSpec {
        name: "craft",
        description: "Craft an item from your inventory: rope (2 fiber), two planks (1 wood), tool (1 wood, 1 stone, 1 rope).",
        parameters: object(json!({ "recipe": {"type": "string", "enum": recipes} }), &["recipe"]),
    }
}

fn build_tool() -> ToolSpec {
    let kinds: Vec<&str> = StructureType::ALL.into_iter().map(StructureType::as_str).collect();
    ToolSpec {
        name: "build",
        description: "Build a structure on an empty tile within reach using materials you carry.",
        parameters: object(
            json!({
                "structure": {"type": "string", "enum": kinds},
                "at": position_schema("Tile to build on")
            }),
            &["structure", "at"],
        ),
    }
}

fn create_crop_field_tool() -> ToolSpec {
    ToolSpec {
        name: "create_crop_field",
        description: "Plant a crop field on a grass tile within reach. It needs time and rain before harvest.",
        parameters: object(json!({ "at": position_schema("Grass tile to plant") }), &["at"]),
    }
}

fn harvest_crop_tool() -> ToolSpec {
    ToolSpec {
        name: "harvest_crop",
        description: "Harvest a mature, watered crop field within reach for food.",
        parameters: object(json!({ "at": position_schema("Field to harvest") }), &["at"]),
    }
}

fn give_resource_tool() -> ToolSpec {
    ToolSpec {
        name: "give_resource",
        description: "Hand some of your resources to an agent you can see.",
        parameters: object(
            json!({
                "recipient": {"type": "string", "description": "Id of the receiver"},
                "resource": {"type": "string", "enum": resource_names(false)},
                "quantity": {"type": "integer", "minimum": 1}
            }),
            &["recipient", "resource", "quantity"],
        ),
    }
}
