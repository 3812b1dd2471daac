//! Interactive session driving the screens from stdin.

use std::time::Duration;

use anyhow::Result;
use recipes::contract::model::{NewAccount, ProfilePatch, Recipe};
use recipes::state::{
    DetailScreen, FavoritesScreen, LoginScreen, Observable, ProfileScreen, RandomScreen,
    RegisterScreen,
};
use recipes::Recipes;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  list                                  all recipes
  show <id>                             recipe detail with favorite flag
  random                                a random recipe
  fav                                   toggle favorite on the recipe last shown
  favorites                             your favorite recipes
  register <email> <password> <name>    create an account and sign in
  login <email> <password>              sign in
  logout                                sign out
  profile                               show your profile
  phone <number> | address <text>       edit your profile
  password <current> <new>              change your password
  help | quit";

const SETTLE: Duration = Duration::from_millis(300);

enum Focus {
    Detail,
    Random,
}

struct Session {
    module: Recipes,
    detail: DetailScreen,
    random: RandomScreen,
    favorites: FavoritesScreen,
    login: LoginScreen,
    register: RegisterScreen,
    profile: ProfileScreen,
    focus: Option<Focus>,
}

pub async fn run(module: Recipes) -> Result<()> {
    let mut session = Session {
        detail: module.detail(),
        random: module.random(),
        favorites: module.favorites(),
        login: module.login(),
        register: module.register(),
        profile: module.profile(),
        module,
        focus: None,
    };

    println!("Recipes session. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown: signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let words: Vec<&str> = line.split_whitespace().collect();
                match words.as_slice() {
                    [] => continue,
                    ["quit"] | ["exit"] => break,
                    _ => session.handle(&words).await?,
                }
            }
        }
    }
    tracing::info!("Session ended");
    Ok(())
}

impl Session {
    async fn handle(&mut self, words: &[&str]) -> Result<()> {
        match words {
            ["help"] => println!("{HELP}"),
            ["list"] => {
                let screen = self.module.dashboard();
                screen.load().await?;
                for recipe in screen.recipes().get() {
                    println!("{:<24} {} ({} kcal)", recipe.id, recipe.title, recipe.calories);
                }
                report(&screen.error());
            }
            ["show", id] => {
                self.detail.load_recipe(id).await?;
                self.focus = Some(Focus::Detail);
                print_current(
                    self.detail.recipe(),
                    self.detail.is_favorite(),
                    &self.detail.error(),
                )
                .await;
            }
            ["random"] => {
                self.random.load_random().await?;
                self.focus = Some(Focus::Random);
                print_current(
                    self.random.recipe(),
                    self.random.is_favorite(),
                    &self.random.error(),
                )
                .await;
            }
            ["fav"] => self.toggle().await?,
            ["favorites"] => {
                self.favorites.open();
                let mut recipes = self.favorites.recipes();
                let _ = tokio::time::timeout(SETTLE, recipes.changed()).await;
                let list = recipes.get();
                if list.is_empty() {
                    println!("No favorites yet");
                }
                for recipe in list {
                    println!("{:<24} {}", recipe.id, recipe.title);
                }
                report(&self.favorites.error());
            }
            ["register", email, password, name @ ..] if !name.is_empty() => {
                self.register
                    .register(NewAccount {
                        full_name: name.join(" "),
                        email: email.to_string(),
                        password: password.to_string(),
                        phone: String::new(),
                        address: String::new(),
                    })
                    .await?;
                if self.register.registered().get() {
                    println!("Registered and signed in as {email}");
                }
                report(&self.register.error());
            }
            ["login", email, password] => {
                self.login.login(email, password).await?;
                if let Some(user) = self.login.user().get() {
                    println!("Signed in as {}", user.email);
                }
                report(&self.login.error());
            }
            ["logout"] => {
                self.login.logout().await?;
                println!("Signed out");
            }
            ["profile"] => {
                self.profile.load().await?;
                if let Some(p) = self.profile.profile().get() {
                    println!("name:    {}", p.full_name);
                    println!("email:   {}", p.email);
                    println!("phone:   {}", p.phone);
                    println!("address: {}", p.address);
                }
                report(&self.profile.error());
            }
            ["phone", number] => {
                self.edit_profile(ProfilePatch {
                    phone: Some(number.to_string()),
                    ..ProfilePatch::default()
                })
                .await?
            }
            ["address", text @ ..] if !text.is_empty() => {
                self.edit_profile(ProfilePatch {
                    address: Some(text.join(" ")),
                    ..ProfilePatch::default()
                })
                .await?
            }
            ["password", current, new] => {
                self.profile.change_password(current, new).await?;
                report(&self.profile.notice());
                report(&self.profile.error());
            }
            _ => println!("Unknown command. Type 'help' for commands."),
        }
        Ok(())
    }

    async fn toggle(&self) -> Result<()> {
        let (write, mut flag) = match self.focus {
            Some(Focus::Detail) => (self.detail.toggle_favorite(), self.detail.is_favorite()),
            Some(Focus::Random) => (self.random.toggle_favorite(), self.random.is_favorite()),
            None => {
                println!("Show a recipe first");
                return Ok(());
            }
        };
        match write {
            Ok(handle) => {
                handle.await?;
                match flag.wait_for(Option::is_some).await.flatten() {
                    Some(true) => println!("Added to favorites"),
                    Some(false) => println!("Removed from favorites"),
                    None => {}
                }
            }
            Err(e) => println!("{e}"),
        }
        Ok(())
    }

    async fn edit_profile(&self, patch: ProfilePatch) -> Result<()> {
        self.profile.update_profile(patch).await?;
        report(&self.profile.notice());
        report(&self.profile.error());
        Ok(())
    }
}

async fn print_current(
    recipe: Observable<Option<Recipe>>,
    mut favorite: Observable<Option<bool>>,
    error: &Observable<Option<String>>,
) {
    if let Some(recipe) = recipe.get() {
        let flag = tokio::time::timeout(SETTLE, favorite.wait_for(Option::is_some))
            .await
            .ok()
            .flatten()
            .flatten();
        crate::print_recipe(&recipe, flag);
    }
    report(error);
}

fn report(message: &Observable<Option<String>>) {
    if let Some(message) = message.get() {
        println!("{message}");
    }
}
