//! Pet store demo
//!
//! ```text
//! cargo run -p petstore                 # serve on 127.0.0.1:8080
//! cargo run -p petstore -- export       # write api.json
//! cargo run -p petstore -- check        # validate and list routes
//! ```
//!
//! ```text
//! curl -X POST localhost:8080/api/v1/pets -d '{"name": "Rex", "species": "dog"}'
//! curl localhost:8080/api/v1/pets?species=dog
//! ```

use routeforge::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pet {
    #[serde(default)]
    id: u64,
    name: String,
    species: String,
    age: i64,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
}

#[derive(Clone, Default)]
struct Store {
    pets: Arc<RwLock<BTreeMap<u64, Pet>>>,
    next_id: Arc<AtomicU64>,
}

impl Store {
    fn insert(&self, mut pet: Pet) -> Result<Pet> {
        pet.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.pets
            .write()
            .map_err(|_| ApiError::internal("pet store unavailable"))?
            .insert(pet.id, pet.clone());
        Ok(pet)
    }

    fn list(&self, species: Option<&str>) -> Result<Vec<Pet>> {
        let pets = self
            .pets
            .read()
            .map_err(|_| ApiError::internal("pet store unavailable"))?;
        Ok(pets
            .values()
            .filter(|pet| species.map_or(true, |species| pet.species == species))
            .cloned()
            .collect())
    }

    fn get(&self, id: u64) -> Result<Pet> {
        self.pets
            .read()
            .map_err(|_| ApiError::internal("pet store unavailable"))?
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("No pet with id {id}")))
    }

    fn remove(&self, id: u64) -> Result<()> {
        self.pets
            .write()
            .map_err(|_| ApiError::internal("pet store unavailable"))?
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(format!("No pet with id {id}")))
    }
}

const SPECIES: [&str; 4] = ["dog", "cat", "bird", "fish"];

fn pet_id(schema: &mut Schema) {
    schema.add_string(
        StringValue::new("id")
            .description("Numeric pet id")
            .required()
            .check_fn(
                |value| value.as_str().is_some_and(|id| id.parse::<u64>().is_ok()),
                "The pet id must be a positive number",
            ),
    );
}

fn pets_group(store: Store) -> Group {
    let create = {
        let store = store.clone();
        move |req: Request| {
            let store = store.clone();
            async move {
                let pet: Pet = req.body_as()?;
                store.insert(pet).map(Created)
            }
        }
    };
    let list = {
        let store = store.clone();
        move |req: Request| {
            let store = store.clone();
            async move {
                let species = req.query().get("species").and_then(|s| s.as_str());
                store.list(species).map(Json)
            }
        }
    };
    let show = {
        let store = store.clone();
        move |req: Request| {
            let store = store.clone();
            async move { store.get(req.param_as("id")?).map(Json) }
        }
    };
    let remove = move |req: Request| {
        let store = store.clone();
        async move {
            store.remove(req.param_as("id")?)?;
            Ok::<_, ApiError>(NoContent)
        }
    };

    Group::new(GroupOptions::new("pets", "/pets").description("Adopt and browse pets"))
        .route(
            Route::new("/")
                .endpoint(
                    Endpoint::new(EndpointOptions::new("GET", "listPets", "List pets"), list)
                        .query_schema(|schema| {
                            schema.add_string(
                                StringValue::new("species")
                                    .description("Only list pets of this species")
                                    .options(SPECIES),
                            );
                        }),
                )
                .endpoint(
                    Endpoint::new(EndpointOptions::new("POST", "createPet", "Add a pet"), create)
                        .body_schema(|schema| {
                            schema
                                .add_string(StringValue::new("name").required().min(1).max(40))
                                .add_string(StringValue::new("species").required().options(SPECIES))
                                .add_integer(IntegerValue::new("age").min(0).max(60).default_value(0))
                                .add_array(
                                    ArrayValue::new("tags")
                                        .unique()
                                        .max(10)
                                        .items(StringValue::new("tag").min(1).max(20))
                                        .default_value(Vec::new()),
                                )
                                .add_image(
                                    ImageValue::new("photo").description("Absolute URL of a photo"),
                                );
                        }),
                ),
        )
        .route(
            Route::new("/{id}")
                .endpoint(
                    Endpoint::new(EndpointOptions::new("GET", "showPet", "Show a pet"), show)
                        .param_schema(pet_id),
                )
                .endpoint(
                    Endpoint::new(EndpointOptions::new("DELETE", "removePet", "Remove a pet"), remove)
                        .param_schema(pet_id),
                ),
        )
}

fn petstore(store: Store) -> Api {
    Api::new(ApiOptions::new("petstore", "A small pet store").base_path("/api"))
        .layer(BodyLimitLayer::new(64 * 1024))
        .version(Version::new(1).group(pets_group(store)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    routeforge::run(petstore(Store::default())).await
}
