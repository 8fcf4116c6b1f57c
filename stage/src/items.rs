//! Recipes processed by machines.

use ant_factory_core::ItemKind;

/// Ingredients a machine must collect before it produces `product`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipe {
    product: ItemKind,
    ingredients: &'static [ItemKind],
}

impl Recipe {
    /// Item produced once every ingredient is stocked.
    #[must_use]
    pub const fn product(&self) -> ItemKind {
        self.product
    }

    /// Ingredients consumed per product, duplicates included.
    #[must_use]
    pub const fn ingredients(&self) -> &'static [ItemKind] {
        self.ingredients
    }

    /// Reports whether `item` is still missing from `stock`.
    #[must_use]
    pub fn needs(&self, stock: &[ItemKind], item: ItemKind) -> bool {
        let required = self.ingredients.iter().filter(|kind| **kind == item).count();
        let stocked = stock.iter().filter(|kind| **kind == item).count();
        stocked < required
    }

    /// Reports whether `stock` holds every ingredient.
    #[must_use]
    pub fn is_satisfied(&self, stock: &[ItemKind]) -> bool {
        self.ingredients
            .iter()
            .all(|ingredient| !self.needs(stock, *ingredient))
    }
}

static RECIPES: [Recipe; 6] = [
    Recipe {
        product: ItemKind::Gearbox,
        ingredients: &[ItemKind::Gear, ItemKind::Gear],
    },
    Recipe {
        product: ItemKind::Motor,
        ingredients: &[ItemKind::Gearbox, ItemKind::Circuit],
    },
    Recipe {
        product: ItemKind::Piston,
        ingredients: &[ItemKind::Pipe, ItemKind::Spring],
    },
    Recipe {
        product: ItemKind::Sensor,
        ingredients: &[ItemKind::Lens, ItemKind::Circuit],
    },
    Recipe {
        product: ItemKind::Processor,
        ingredients: &[ItemKind::Circuit, ItemKind::Circuit],
    },
    Recipe {
        product: ItemKind::Ant,
        ingredients: &[ItemKind::AntHead, ItemKind::AntMiddle, ItemKind::AntBack],
    },
];

/// Looks up the recipe producing `product`, if any.
#[must_use]
pub fn recipe_for(product: ItemKind) -> Option<&'static Recipe> {
    RECIPES.iter().find(|recipe| recipe.product == product)
}
