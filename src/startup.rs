use std::net::TcpListener;

use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    configuration::Settings,
    routes::{analyze_route, default_route, export_route},
    services::{OpenaiClient, ResultStore},
};

pub fn run(
    listener: TcpListener,
    settings: Settings,
    openai_client: OpenaiClient,
    store: ResultStore,
) -> Result<Server, std::io::Error> {
    let settings = Data::new(settings);
    let openai_client = Data::new(openai_client);
    let store = Data::new(store);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::health_check)
            .service(analyze_route::analyze)
            .service(export_route::export_document)
            .service(
                web::scope("/complete")
                    .service(analyze_route::analyze_complete)
                    .service(analyze_route::get_analysis)
                    .service(analyze_route::delete_analysis),
            )
            .app_data(settings.clone())
            .app_data(openai_client.clone())
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
