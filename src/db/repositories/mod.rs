mod thoughts;
